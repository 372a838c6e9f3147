use data_schema::descriptor::Principal;
use data_schema::graph::{ExternalReference, FieldOrigin, TypeRef};
use data_schema::prelude::*;
use data_schema::{ErrorKind, PartialSchema, SchemaError, SchemaGraph};

fn customers() -> SchemaGraph {
    schema([(
        "Customer",
        model()
            .field("name", string().required())
            .authorization([allow::owner()]),
    )])
    .build()
    .unwrap()
}

fn orders() -> SchemaBuilder {
    let mut builder = schema([(
        "Order",
        model()
            .field("total", float())
            .relationship("customer", belongs_to("Customer")),
    )]);
    builder.authorization([allow::public_api_key()]).unwrap();
    builder
}

#[test]
fn duplicate_names_collide() {
    let users = || {
        schema([("User", model().field("name", string()))])
            .build()
            .unwrap()
    };

    let err = combine([users(), users()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CombineCollision);
    assert!(matches!(
        err,
        SchemaError::CombineCollision { ref name, ref kind } if name == "User" && kind == "model"
    ));
}

#[test]
fn collision_across_definition_kinds() {
    let a = schema([("Status", enumeration(["on", "off"]))]).build().unwrap();
    let b = schema([("Status", model())]).build().unwrap();
    let err = combine([a, b]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CombineCollision);
}

#[test]
fn partial_schema_records_open_references() {
    let err = orders().build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DanglingRelationship);

    let partial = orders().build_partial().unwrap();
    assert!(!partial.is_self_contained());
    assert_eq!(
        partial.external_references(),
        [ExternalReference {
            owner: "Order".to_string(),
            member: "customer".to_string(),
            symbol: "Customer".to_string(),
        }]
    );
    assert_eq!(partial.definition_names().collect::<Vec<_>>(), ["Order"]);
}

#[test]
fn combine_resolves_cross_schema_relationships() {
    let partial = orders().build_partial().unwrap();
    let graph = combine(vec![PartialSchema::from(customers()), partial]).unwrap();

    let order = graph.model("Order").unwrap();
    let edge = order.relationship("customer").unwrap();
    assert_eq!(edge.target, "Customer");
    assert_eq!(edge.foreign_keys, ["customerId"]);
    assert!(order.field("customerId").is_some());
    assert!(graph.model("Customer").unwrap().field("owner").is_some());
}

#[test]
fn combine_keeps_each_schema_rules() {
    let partial = orders().build_partial().unwrap();
    let graph = combine(vec![partial, customers().into()]).unwrap();

    let order = graph.model("Order").unwrap();
    assert_eq!(order.auth_rules.len(), 1);
    assert_eq!(order.auth_rules[0].principal(), &Principal::PublicApiKey);

    let customer = graph.model("Customer").unwrap();
    assert_eq!(customer.auth_rules.len(), 1);
    assert!(matches!(customer.auth_rules[0].principal(), Principal::Owner { .. }));

    assert_eq!(graph.global_auth_rules().len(), 1);
}

#[test]
fn combine_resolves_cross_schema_types() {
    let mut tasks = schema([(
        "Task",
        model().field("status", reference("Status").required()),
    )]);
    let partial = tasks.build_partial().unwrap();
    assert_eq!(partial.external_references()[0].symbol, "Status");

    let statuses = schema([("Status", enumeration(["open", "done"]))])
        .build()
        .unwrap();
    let graph = combine(vec![partial, statuses.into()]).unwrap();

    let status = graph.model("Task").unwrap().field("status").unwrap();
    assert_eq!(status.field_type, TypeRef::Enum("Status".to_string()));
}

#[test]
fn combine_still_rejects_unresolved_names() {
    let partial = orders().build_partial().unwrap();
    let unrelated = schema([("Invoice", model())]).build().unwrap();
    let err = combine(vec![partial, unrelated.into()]).unwrap_err();
    assert!(matches!(err, SchemaError::MissingTargetModel { ref target, .. } if target == "Customer"));
}

#[test]
fn combined_graph_can_be_combined_again() {
    let first = combine(vec![orders().build_partial().unwrap(), customers().into()]).unwrap();
    let products = schema([("Product", model().field("sku", string()))])
        .build()
        .unwrap();
    let graph = combine([first, products]).unwrap();

    let names: Vec<&str> = graph.models().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["Customer", "Order", "Product"]);
}

fn keyed(config: SchemaConfig) -> SchemaGraph {
    let mut builder = SchemaBuilder::with_config(config);
    builder.add("Account", model()).unwrap();
    builder.build().unwrap()
}

#[test]
fn each_schema_keeps_its_configuration() {
    let accounts = keyed(SchemaConfig {
        identifier_field: "key".to_string(),
        ..SchemaConfig::default()
    });

    let graph = combine([accounts, customers()]).unwrap();
    assert_eq!(graph.config().identifier_field, "key");
    assert_eq!(graph.model("Account").unwrap().identifier, ["key"]);
    let customer = graph.model("Customer").unwrap();
    assert_eq!(customer.identifier, ["id"]);
    assert!(customer.field("key").is_none());
}

#[test]
fn declared_field_named_like_another_schema_identifier() {
    let accounts = keyed(SchemaConfig {
        identifier_field: "key".to_string(),
        ..SchemaConfig::default()
    });
    let doors = schema([("Door", model().field("key", string()))])
        .build()
        .unwrap();

    let graph = combine([accounts, doors]).unwrap();
    let door = graph.model("Door").unwrap();
    assert_eq!(door.identifier, ["id"]);
    assert_eq!(door.field("key").unwrap().origin, FieldOrigin::Declared);
    assert!(!door.field("key").unwrap().required);
}

#[test]
fn timestamps_follow_each_schema() {
    let plain = keyed(SchemaConfig {
        timestamps: false,
        ..SchemaConfig::default()
    });

    let graph = combine([customers(), plain.clone()]).unwrap();
    assert!(graph.model("Account").unwrap().field("createdAt").is_none());
    assert!(graph.model("Customer").unwrap().field("createdAt").is_some());

    let graph = combine([plain, customers()]).unwrap();
    assert!(!graph.config().timestamps);
    assert!(graph.model("Account").unwrap().field("updatedAt").is_none());
    assert!(graph.model("Customer").unwrap().field("updatedAt").is_some());
}

#[test]
fn lifted_types_collide_with_declared_types() {
    let tasks = || {
        schema([("Task", model().field("status", enumeration(["open", "done"])))])
            .build()
            .unwrap()
    };

    for values in [["open", "done"], ["todo", "doing"]] {
        let statuses = schema([("Status", enumeration(values))]).build().unwrap();
        let err = combine([tasks(), statuses]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CombineCollision);
        assert!(matches!(
            err,
            SchemaError::CombineCollision { ref name, ref kind } if name == "Status" && kind == "enum"
        ));
    }
}

#[test]
fn join_models_collide_with_declared_models() {
    let posts = schema([
        ("Post", model().relationship("tags", many_to_many("Tag"))),
        ("Tag", model().relationship("posts", many_to_many("Post"))),
    ])
    .build()
    .unwrap();
    assert!(posts.model("PostTag").is_some());
    let other = schema([("PostTag", model())]).build().unwrap();

    let err = combine([posts, other]).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::CombineCollision { ref name, .. } if name == "PostTag"
    ));
}

#[test]
fn empty_combination_is_an_empty_graph() {
    let graph = combine(Vec::<SchemaGraph>::new()).unwrap();
    assert_eq!(graph.models().count(), 0);
    assert_eq!(graph.config(), &SchemaConfig::default());
}
