use crate::compile;
use crate::names;
use crate::response_names;
use crate::type_conditions;
use pretty_assertions::assert_eq;

#[test]
fn narrowing_an_interface_field() {
    let compiled = compile(
        r#"
        query PetQuery {
          pet {
            name
            ... on Dog { breed }
          }
        }
        "#,
    );
    let pet = compiled.operation("PetQuery").unwrap().field("pet").unwrap();
    assert_eq!(response_names(pet.fields()), ["name"]);
    assert_eq!(type_conditions(pet.inline_fragments()), ["Dog"]);

    let dog = pet.inline_fragment("Dog").unwrap();
    assert_eq!(names(&dog.possible_types), ["Dog"]);
    // Fields selected on the interface apply to every branch
    assert_eq!(response_names(&dog.fields), ["name", "breed"]);
    assert!(dog.fragment_spreads.is_empty());
}

#[test]
fn branches_follow_first_selection_order() {
    let compiled = compile(
        r#"
        query Search {
          search(text: "r2") {
            ... on Starship { name length }
            ... on Human { name height }
            ... on Droid { name primaryFunction }
            ... on Human { homePlanet }
          }
        }
        "#,
    );
    let search = compiled.operation("Search").unwrap().field("search").unwrap();
    assert!(search.fields().is_empty());
    assert_eq!(
        type_conditions(search.inline_fragments()),
        ["Starship", "Human", "Droid"]
    );
    let human = search.inline_fragment("Human").unwrap();
    assert_eq!(response_names(&human.fields), ["name", "height", "homePlanet"]);
    let droid = search.inline_fragment("Droid").unwrap();
    assert_eq!(response_names(&droid.fields), ["name", "primaryFunction"]);
}

#[test]
fn inline_fragment_without_type_condition() {
    let compiled = compile(
        r#"
        query HeroQuery($expand: Boolean!) {
          hero {
            ... @include(if: $expand) { name }
          }
        }
        "#,
    );
    let hero = compiled.operation("HeroQuery").unwrap().field("hero").unwrap();
    assert_eq!(response_names(hero.fields()), ["name"]);
    assert!(hero.inline_fragments().is_empty());
}

#[test]
fn fragments_on_the_parent_type_are_flattened() {
    let compiled = compile(
        r#"
        query HeroQuery {
          hero {
            ... on Character { name }
          }
          search(text: "") {
            ... on SearchResult { __typename }
          }
        }
        "#,
    );
    let operation = compiled.operation("HeroQuery").unwrap();
    let hero = operation.field("hero").unwrap();
    assert_eq!(response_names(hero.fields()), ["name"]);
    assert!(hero.inline_fragments().is_empty());
    let search = operation.field("search").unwrap();
    assert_eq!(response_names(search.fields()), ["__typename"]);
    assert!(search.inline_fragments().is_empty());
}

#[test]
fn object_type_fields_ignore_redundant_conditions() {
    let compiled = compile(
        r#"
        query Search {
          search(text: "") {
            ... on Human {
              ... on Character { name }
              ... on Node { id }
              height
            }
          }
        }
        "#,
    );
    let search = compiled.operation("Search").unwrap().field("search").unwrap();
    assert_eq!(type_conditions(search.inline_fragments()), ["Human"]);
    let human = search.inline_fragment("Human").unwrap();
    assert_eq!(response_names(&human.fields), ["name", "id", "height"]);
}

#[test]
fn narrowing_to_another_abstract_type() {
    let compiled = compile(
        r#"
        query Search {
          search(text: "") {
            __typename
            ... on Character { name }
          }
        }
        "#,
    );
    let search = compiled.operation("Search").unwrap().field("search").unwrap();
    assert_eq!(response_names(search.fields()), ["__typename"]);
    // Starship is a search result but not a character
    assert_eq!(type_conditions(search.inline_fragments()), ["Human", "Droid"]);
    let droid = search.inline_fragment("Droid").unwrap();
    assert_eq!(response_names(&droid.fields), ["__typename", "name"]);
}

#[test]
fn nested_fields_merge_across_branches() {
    let compiled = compile(
        r#"
        query HeroQuery {
          hero {
            friends { name }
            ... on Human { friends { ... on Droid { primaryFunction } } }
          }
        }
        "#,
    );
    let hero = compiled.operation("HeroQuery").unwrap().field("hero").unwrap();

    let friends = hero.field("friends").unwrap();
    assert_eq!(response_names(friends.fields()), ["name"]);
    assert!(friends.inline_fragments().is_empty());

    let human = hero.inline_fragment("Human").unwrap();
    let human_friends = human.field("friends").unwrap();
    assert_eq!(response_names(human_friends.fields()), ["name"]);
    assert_eq!(type_conditions(human_friends.inline_fragments()), ["Droid"]);
    let droid = human_friends.inline_fragment("Droid").unwrap();
    assert_eq!(response_names(&droid.fields), ["name", "primaryFunction"]);
}

#[test]
fn widening_to_an_implemented_interface_does_not_branch() {
    let compiled = compile(
        r#"
        query HeroQuery {
          hero {
            name
            ... on Node { id }
            ...NodeId
          }
        }

        fragment NodeId on Node { id }
        "#,
    );
    let hero = compiled.operation("HeroQuery").unwrap().field("hero").unwrap();
    assert_eq!(response_names(hero.fields()), ["name", "id"]);
    assert!(hero.inline_fragments().is_empty());
    assert_eq!(names(hero.fragment_spreads()), ["NodeId"]);
}

#[test]
fn widening_alongside_narrowing_branches_only_on_the_narrower_type() {
    let compiled = compile(
        r#"
        query HeroQuery {
          hero {
            ... on Node { id }
            ... on Human { height }
          }
        }
        "#,
    );
    let hero = compiled.operation("HeroQuery").unwrap().field("hero").unwrap();
    assert_eq!(response_names(hero.fields()), ["id"]);
    assert_eq!(type_conditions(hero.inline_fragments()), ["Human"]);
    let human = hero.inline_fragment("Human").unwrap();
    assert_eq!(response_names(&human.fields), ["id", "height"]);
}
