use crate::compile;
use crate::names;
use crate::response_names;
use crate::type_conditions;
use expect_test::expect;
use pretty_assertions::assert_eq;

const NESTED_FRAGMENTS: &str = r#"
query HeroQuery {
  hero { ...HeroDetails }
}

fragment HeroDetails on Character {
  name
  ...HeroFriends
}

fragment HeroFriends on Character {
  friends { ...FriendName }
}

fragment FriendName on Character {
  name
}
"#;

#[test]
fn fragments_referenced_is_transitive() {
    let compiled = compile(NESTED_FRAGMENTS);
    let operation = compiled.operation("HeroQuery").unwrap();
    assert_eq!(
        names(&operation.fragments_referenced),
        ["HeroDetails", "HeroFriends", "FriendName"]
    );

    let hero_details = compiled.fragment("HeroDetails").unwrap();
    assert_eq!(
        names(&hero_details.fragments_referenced),
        ["HeroFriends", "FriendName"]
    );
    let hero_friends = compiled.fragment("HeroFriends").unwrap();
    assert_eq!(names(&hero_friends.fragments_referenced), ["FriendName"]);
    let friend_name = compiled.fragment("FriendName").unwrap();
    assert!(friend_name.fragments_referenced.is_empty());
}

#[test]
fn spread_fields_are_merged_in() {
    let compiled = compile(NESTED_FRAGMENTS);
    let hero = compiled.operation("HeroQuery").unwrap().field("hero").unwrap();
    assert_eq!(response_names(hero.fields()), ["name", "friends"]);
    assert_eq!(names(hero.fragment_spreads()), ["HeroDetails", "HeroFriends"]);
    let friends = hero.field("friends").unwrap();
    assert_eq!(response_names(friends.fields()), ["name"]);
    assert_eq!(names(friends.fragment_spreads()), ["FriendName"]);

    let hero_details = compiled.fragment("HeroDetails").unwrap();
    assert_eq!(response_names(&hero_details.fields), ["name", "friends"]);
    assert_eq!(names(&hero_details.fragment_spreads), ["HeroFriends"]);
}

#[test]
fn source_with_fragments_appends_every_referenced_fragment() {
    let compiled = compile(NESTED_FRAGMENTS);
    let operation = compiled.operation("HeroQuery").unwrap();
    assert!(operation
        .source_with_fragments
        .starts_with(&operation.source));
    expect![[r#"
        query HeroQuery {
          hero {
            __typename
            ...HeroDetails
          }
        }

        fragment HeroDetails on Character {
          __typename
          name
          ...HeroFriends
        }

        fragment HeroFriends on Character {
          __typename
          friends {
            __typename
            ...FriendName
          }
        }

        fragment FriendName on Character {
          __typename
          name
        }"#]]
    .assert_eq(&operation.source_with_fragments);
}

#[test]
fn repeated_spreads_are_listed_once() {
    let compiled = compile(
        r#"
        query HeroQuery {
          hero {
            ...HeroName
            ...HeroName
            ... on Character { ...HeroName }
          }
        }

        fragment HeroName on Character { name }
        "#,
    );
    let operation = compiled.operation("HeroQuery").unwrap();
    let hero = operation.field("hero").unwrap();
    assert_eq!(names(hero.fragment_spreads()), ["HeroName"]);
    assert_eq!(response_names(hero.fields()), ["name"]);
    assert_eq!(names(&operation.fragments_referenced), ["HeroName"]);
    assert_eq!(operation.source_with_fragments.matches("fragment HeroName").count(), 1);
}

#[test]
fn concrete_fragment_spread_on_an_interface() {
    let compiled = compile(
        r#"
        query PetQuery {
          pet { ...DogFields }
        }

        fragment DogFields on Dog { breed }
        "#,
    );
    let pet = compiled.operation("PetQuery").unwrap().field("pet").unwrap();
    assert!(pet.fields().is_empty());
    assert!(pet.fragment_spreads().is_empty());
    assert_eq!(type_conditions(pet.inline_fragments()), ["Dog"]);
    let dog = pet.inline_fragment("Dog").unwrap();
    assert_eq!(response_names(&dog.fields), ["breed"]);
    assert_eq!(names(&dog.fragment_spreads), ["DogFields"]);
    assert_eq!(names(&dog.possible_types), ["Dog"]);

    let dog_fields = compiled.fragment("DogFields").unwrap();
    assert_eq!(dog_fields.type_condition, "Dog");
    assert_eq!(names(&dog_fields.possible_types), ["Dog"]);
}

#[test]
fn interface_fragment_spread_within_a_concrete_branch() {
    let compiled = compile(
        r#"
        query PetQuery {
          pet {
            ... on Dog { ...PetName }
          }
        }

        fragment PetName on Pet { name }
        "#,
    );
    let pet = compiled.operation("PetQuery").unwrap().field("pet").unwrap();
    assert!(pet.fields().is_empty());
    assert!(pet.fragment_spreads().is_empty());
    let dog = pet.inline_fragment("Dog").unwrap();
    assert_eq!(names(&dog.possible_types), ["Dog"]);
    assert_eq!(response_names(&dog.fields), ["name"]);
    assert_eq!(names(&dog.fragment_spreads), ["PetName"]);

    let pet_name = compiled.fragment("PetName").unwrap();
    assert_eq!(names(&pet_name.possible_types), ["Dog", "Cat"]);
}

#[test]
fn interface_fragment_spreads_apply_to_branches() {
    let compiled = compile(
        r#"
        query PetQuery {
          pet {
            ...PetName
            ... on Dog { breed }
          }
        }

        fragment PetName on Pet { name }
        "#,
    );
    let pet = compiled.operation("PetQuery").unwrap().field("pet").unwrap();
    assert_eq!(response_names(pet.fields()), ["name"]);
    assert_eq!(names(pet.fragment_spreads()), ["PetName"]);
    let dog = pet.inline_fragment("Dog").unwrap();
    assert_eq!(response_names(&dog.fields), ["name", "breed"]);
    assert_eq!(names(&dog.fragment_spreads), ["PetName"]);
}

#[test]
fn fragment_on_a_union() {
    let compiled = compile(
        r#"
        fragment SearchFields on SearchResult {
          __typename
          ... on Starship { length }
        }
        "#,
    );
    let search_fields = compiled.fragment("SearchFields").unwrap();
    assert_eq!(search_fields.type_condition, "SearchResult");
    assert_eq!(
        names(&search_fields.possible_types),
        ["Human", "Droid", "Starship"]
    );
    assert_eq!(response_names(&search_fields.fields), ["__typename"]);
    let starship = search_fields.inline_fragment("Starship").unwrap();
    assert_eq!(response_names(&starship.fields), ["__typename", "length"]);
    assert_eq!(
        search_fields.source,
        "fragment SearchFields on SearchResult {\n  __typename\n  ... on Starship {\n    __typename\n    length\n  }\n}"
    );
}

#[test]
fn shared_fragments_across_operations() {
    let compiled = compile(
        r#"
        query First { hero { ...HeroFriends } }
        query Second { hero { friends { ...HeroFriends } } }

        fragment HeroFriends on Character { friends { ...FriendName } }
        fragment FriendName on Character { name }
        "#,
    );
    for operation_name in ["First", "Second"] {
        let operation = compiled.operation(operation_name).unwrap();
        assert_eq!(
            names(&operation.fragments_referenced),
            ["HeroFriends", "FriendName"]
        );
    }
}

#[test]
fn sibling_spreads_merge_the_same_field() {
    let compiled = compile(
        r#"
        query HeroQuery {
          hero { ...HeroFriendNames ...HeroFriendIds }
        }

        fragment HeroFriendNames on Character { friends { name } }
        fragment HeroFriendIds on Character { friends { id: __typename name } }
        "#,
    );
    let hero = compiled.operation("HeroQuery").unwrap().field("hero").unwrap();
    assert_eq!(response_names(hero.fields()), ["friends"]);
    assert_eq!(
        names(hero.fragment_spreads()),
        ["HeroFriendNames", "HeroFriendIds"]
    );
    let friends = hero.field("friends").unwrap();
    assert_eq!(response_names(friends.fields()), ["name", "id"]);
    assert_eq!(friends.field("id").unwrap().field_name, "__typename");
}
