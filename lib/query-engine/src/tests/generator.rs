use std::error::Error;

use serde_json::json;

use crate::{
    generator::{error::GenerateError, OperationKind, QueryGenerator},
    request::{RequestNode, Selection},
    schema::Schema,
    tests::testkit::{anilist_schema, init_logger},
};

fn request(value: serde_json::Value) -> RequestNode {
    RequestNode::try_from(value).expect("request should parse")
}

#[test]
fn scalar_shorthand_expands_to_scalar_fields() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let operation = QueryGenerator::new(&schema).generate_query(&request(json!({
        "Media": { "__args": { "id": 1 }, "__scalar": true }
    })))?;

    insta::assert_snapshot!(operation.query, @"query($v0:Int){Media(id:$v0){...f0}},fragment f0 on Media{id,idMal,type,episodes,averageScore,description}");

    let scalar_fields = &schema.type_by_name("Media").expect("Media").scalar_fields;
    assert!(operation
        .query
        .ends_with(&format!("fragment f0 on Media{{{}}}", scalar_fields.join(","))));
    assert_eq!(operation.variables, json!({ "v0": 1 }).as_object().cloned());
    assert_eq!(operation.operation_name, None);

    Ok(())
}

#[test]
fn scalar_shorthand_honours_exclusions() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let operation = QueryGenerator::new(&schema).generate_query(&request(json!({
        "Media": {
            "__args": { "id": 1 },
            "__scalar": true,
            "description": false,
            "title": { "romaji": true }
        }
    })))?;

    insta::assert_snapshot!(operation.query, @"query($v0:Int){Media(id:$v0){...f0,title{romaji}}},fragment f0 on Media{id,idMal,type,episodes,averageScore}");

    Ok(())
}

#[test]
fn every_argument_gets_its_own_variable() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let operation = QueryGenerator::new(&schema).generate_query(&request(json!({
        "Page": {
            "__args": { "page": 2, "perPage": 10 },
            "media": {
                "__args": { "search": "Frieren", "type": "ANIME" },
                "id": true
            }
        }
    })))?;

    insta::assert_snapshot!(operation.query, @"query($v0:Int,$v1:Int,$v2:String,$v3:MediaType){Page(page:$v0,perPage:$v1){media(search:$v2,type:$v3){id}}}");
    assert_eq!(
        serde_json::to_value(&operation.variables)?,
        json!({ "v0": 2, "v1": 10, "v2": "Frieren", "v3": "ANIME" })
    );

    Ok(())
}

#[test]
fn operation_name_and_literal_list_arguments() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let operation = QueryGenerator::new(&schema).generate_query(&request(json!({
        "__name": "ByIds",
        "Media": { "__args": { "id_in": [1, 2] }, "title": { "english": true } }
    })))?;

    insta::assert_snapshot!(operation.query, @"query ByIds($v0:[Int]){Media(id_in:$v0){title{english}}}");
    assert_eq!(operation.operation_name.as_deref(), Some("ByIds"));
    assert_eq!(
        serde_json::to_value(&operation)?,
        json!({
            "query": "query ByIds($v0:[Int]){Media(id_in:$v0){title{english}}}",
            "variables": { "v0": [1, 2] },
            "operationName": "ByIds"
        })
    );

    Ok(())
}

#[test]
fn no_variables_no_declarations() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let operation = QueryGenerator::new(&schema).generate_query(&request(json!({
        "__name": "",
        "Viewer": { "id": true, "name": true }
    })))?;

    insta::assert_snapshot!(operation.query, @"query{Viewer{id,name}}");
    assert_eq!(operation.variables, None);
    assert_eq!(operation.operation_name, None);

    Ok(())
}

#[test]
fn mutation_uses_declared_type_strings() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let operation = QueryGenerator::new(&schema).generate_mutation(&request(json!({
        "SaveMediaListEntry": {
            "__args": { "mediaId": 1, "progress": 3 },
            "id": true,
            "progress": true
        }
    })))?;

    insta::assert_snapshot!(operation.query, @"mutation($v0:Int!,$v1:Int){SaveMediaListEntry(mediaId:$v0,progress:$v1){id,progress}}");

    Ok(())
}

#[test]
fn arguments_only_field_is_a_leaf() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let node = Selection::new().field(
        "User",
        Selection::new()
            .arg("name", "alice")
            .field("about", Selection::new().arg("asHtml", true)),
    );
    let operation = QueryGenerator::new(&schema).generate_query(&node.into())?;

    insta::assert_snapshot!(operation.query, @"query($v0:String,$v1:Boolean){User(name:$v0){about(asHtml:$v1)}}");

    Ok(())
}

#[test]
fn inline_fragments_become_named_fragments() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let operation = QueryGenerator::new(&schema).generate_query(&request(json!({
        "Activity": {
            "__args": { "id": 7 },
            "on_TextActivity": { "text": true, "user": { "name": true } },
            "on_ListActivity": { "status": true, "media": { "title": { "romaji": true } } }
        }
    })))?;

    insta::assert_snapshot!(operation.query, @"query($v0:Int){Activity(id:$v0){...f0,...f1}},fragment f0 on TextActivity{text,user{name}},fragment f1 on ListActivity{status,media{title{romaji}}}");

    Ok(())
}

#[test]
fn nested_fragments_are_emitted_innermost_first() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let operation = QueryGenerator::new(&schema).generate_query(&request(json!({
        "Activity": { "__args": { "id": 7 }, "on_TextActivity": { "__scalar": true } }
    })))?;

    insta::assert_snapshot!(operation.query, @"query($v0:Int){Activity(id:$v0){...f0}},fragment f1 on TextActivity{id,text,createdAt},fragment f0 on TextActivity{...f1}");

    Ok(())
}

#[test]
fn fragment_on_the_current_type_is_allowed() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let operation = QueryGenerator::new(&schema).generate_query(&request(json!({
        "Viewer": { "on_User": { "id": true } }
    })))?;

    insta::assert_snapshot!(operation.query, @"query{Viewer{...f0}},fragment f0 on User{id}");

    Ok(())
}

#[test]
fn fragment_on_an_unrelated_type_fails() {
    init_logger();
    let schema = anilist_schema();
    let generator = QueryGenerator::new(&schema);

    assert_eq!(
        generator.generate_query(&request(json!({
            "Viewer": { "on_Media": { "episodes": true } }
        }))),
        Err(GenerateError::UnknownField {
            field: "on_Media".to_string(),
            type_name: "User".to_string(),
            path: "Viewer.on_Media".to_string()
        })
    );
    assert_eq!(
        generator.generate_query(&request(json!({
            "Activity": {
                "__args": { "id": 7 },
                "on_TextActivity": { "on_MediaList": { "progress": true } }
            }
        }))),
        Err(GenerateError::UnknownField {
            field: "on_MediaList".to_string(),
            type_name: "TextActivity".to_string(),
            path: "Activity.on_TextActivity.on_MediaList".to_string()
        })
    );
}

#[test]
fn fields_resolve_through_first_fragment_target() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let generator = QueryGenerator::new(&schema);

    // both activity types declare `replies`, TextActivity comes first
    let implicit = generator.generate_query(&request(json!({
        "Activity": {
            "__args": { "id": 7 },
            "replies": { "__args": { "perPage": 5 }, "id": true }
        }
    })))?;
    insta::assert_snapshot!(implicit.query, @"query($v0:Int,$v1:Int){Activity(id:$v0){replies(perPage:$v1){id}}}");

    let explicit = generator.generate_query(&request(json!({
        "Activity": {
            "__args": { "id": 7 },
            "on_ListActivity": { "replies": { "__args": { "perPage": 5 }, "id": true } }
        }
    })))?;
    insta::assert_snapshot!(explicit.query, @"query($v0:Int,$v1:Int!){Activity(id:$v0){...f0}},fragment f0 on ListActivity{replies(perPage:$v1){id}}");

    Ok(())
}

#[test]
fn generation_is_deterministic() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = anilist_schema();
    let generator = QueryGenerator::new(&schema);
    let node = request(json!({
        "Page": {
            "__args": { "page": 1 },
            "characters": { "__scalar": true, "name": { "full": true } }
        }
    }));

    let first = generator.generate_query(&node)?;
    let second = generator.generate_query(&node)?;

    assert_eq!(first, second);
    insta::assert_snapshot!(first.query, @"query($v0:Int){Page(page:$v0){characters{...f0,name{full}}}},fragment f0 on Character{id,favourites}");

    Ok(())
}

#[test]
fn empty_selections_fail() {
    init_logger();
    let schema = anilist_schema();
    let generator = QueryGenerator::new(&schema);

    assert_eq!(
        generator.generate_query(&request(json!({}))),
        Err(GenerateError::EmptySelection {
            path: "<root>".to_string()
        })
    );
    assert_eq!(
        generator.generate_query(&request(json!({ "Viewer": {} }))),
        Err(GenerateError::EmptySelection {
            path: "Viewer".to_string()
        })
    );
    assert_eq!(
        generator.generate_query(&request(json!({
            "Media": { "__args": { "id": 1 }, "title": false }
        }))),
        Err(GenerateError::EmptySelection {
            path: "Media".to_string()
        })
    );
}

#[test]
fn unknown_fields_and_arguments_fail() {
    init_logger();
    let schema = anilist_schema();
    let generator = QueryGenerator::new(&schema);

    assert_eq!(
        generator.generate_query(&request(json!({
            "Media": { "__args": { "id": 1 }, "studios": true }
        }))),
        Err(GenerateError::UnknownField {
            field: "studios".to_string(),
            type_name: "Media".to_string(),
            path: "Media".to_string()
        })
    );
    assert_eq!(
        generator.generate_query(&request(json!({
            "Page": { "media": { "title": { "jp": true } } }
        }))),
        Err(GenerateError::UnknownField {
            field: "jp".to_string(),
            type_name: "MediaTitle".to_string(),
            path: "Page.media.title".to_string()
        })
    );
    assert_eq!(
        generator.generate_query(&request(json!({
            "Media": { "__args": { "season": "WINTER" }, "id": true }
        }))),
        Err(GenerateError::UnknownArgument {
            argument: "season".to_string(),
            field: "Media".to_string(),
            path: "Media".to_string()
        })
    );
    assert_eq!(
        generator.generate_query(&request(json!({
            "Viewer": { "on_Robot": { "id": true } }
        }))),
        Err(GenerateError::UnknownType("Robot".to_string()))
    );
}

#[test]
fn arguments_need_an_owning_field() {
    init_logger();
    let schema = anilist_schema();
    let generator = QueryGenerator::new(&schema);

    assert_eq!(
        generator.generate_query(&request(json!({
            "__args": { "id": 1 },
            "Viewer": { "id": true }
        }))),
        Err(GenerateError::ArgumentsWithoutField {
            path: "<root>".to_string()
        })
    );
    assert_eq!(
        generator.generate_query(&request(json!({
            "Activity": { "on_TextActivity": { "__args": { "asHtml": true }, "text": true } }
        }))),
        Err(GenerateError::ArgumentsWithoutField {
            path: "Activity.on_TextActivity".to_string()
        })
    );
}

#[test]
fn root_must_exist_and_be_a_selection() {
    init_logger();
    let schema = anilist_schema();
    let generator = QueryGenerator::new(&schema);

    assert_eq!(
        generator.generate_query(&RequestNode::Leaf(true)),
        Err(GenerateError::RootMustBeSelection)
    );
    assert_eq!(
        generator.generate(
            OperationKind::Query,
            "Subscription",
            &request(json!({ "Viewer": { "id": true } }))
        ),
        Err(GenerateError::MissingRootType("Subscription".to_string()))
    );
}

#[test]
fn dangling_reference_fails_at_generation() -> Result<(), Box<dyn Error>> {
    init_logger();
    let schema = Schema::from_json(
        r#"{ "scalars": [0], "types": { "Int": {}, "Query": { "broken": [9], "ok": [0] } } }"#,
    )?;
    let generator = QueryGenerator::new(&schema);

    let operation = generator.generate_query(&request(json!({ "ok": true })))?;
    insta::assert_snapshot!(operation.query, @"query{ok}");

    assert_eq!(
        generator.generate_query(&request(json!({ "broken": { "id": true } }))),
        Err(GenerateError::DanglingTypeReference {
            type_name: "Query".to_string(),
            field: "broken".to_string()
        })
    );

    Ok(())
}
