use data_schema::descriptor::{Definition, FieldDescriptor};
use data_schema::shape::{FieldShape, ShapeType};
use data_schema::prelude::*;
use data_schema::SchemaGraph;
use proptest::prelude::*;

fn todo_graph() -> SchemaGraph {
    schema([
        ("Priority", Definition::from(enumeration(["low", "high"]))),
        (
            "Todo",
            model()
                .field("content", string().required())
                .field("priority", reference("Priority").default("low"))
                .field(
                    "secret",
                    string().authorization([allow::guest().to([Operation::Read])]),
                )
                .authorization([allow::owner()])
                .into(),
        ),
        (
            "Task",
            model()
                .field("priority", reference("Priority"))
                .authorization([allow::authenticated()])
                .into(),
        ),
        (
            "echo",
            query()
                .argument("content", string().required())
                .returns(string())
                .authorization([allow::guest()])
                .into(),
        ),
    ])
    .build()
    .unwrap()
}

fn names(fields: &[FieldShape]) -> Vec<&str> {
    fields.iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn enums_are_listed_once() {
    let shape = ClientShape::derive(&todo_graph());
    assert_eq!(shape.enums.len(), 1);
    assert_eq!(shape.enums["Priority"], ["low", "high"]);

    let todo = shape.model("Todo").unwrap();
    assert_eq!(
        todo.field("priority").unwrap().ty,
        ShapeType::Enum("Priority".to_string())
    );
}

#[test]
fn unrestricted_shape_lists_everything() {
    let shape = ClientShape::derive(&todo_graph());
    let todo = shape.model("Todo").unwrap();

    assert_eq!(
        names(&todo.fields),
        ["id", "content", "priority", "secret", "owner", "createdAt", "updatedAt"]
    );
    assert!(todo.can_delete);

    let create = todo.create_input.as_ref().unwrap();
    assert_eq!(names(create), ["id", "content", "priority", "secret", "owner"]);
    let required: Vec<&str> = create
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(required, ["content"]);

    let update = todo.update_input.as_ref().unwrap();
    assert_eq!(update[0].name, "id");
    assert!(update[0].required);
    assert!(update[1..].iter().all(|f| !f.required));

    assert!(shape.operations.contains_key("echo"));
}

#[test]
fn guest_shape_is_filtered() {
    let shape = ClientShape::for_caller(&todo_graph(), &Caller::guest());

    let todo = shape.model("Todo").unwrap();
    assert_eq!(names(&todo.fields), ["secret"]);
    assert!(todo.create_input.is_none());
    assert!(todo.update_input.is_none());
    assert!(!todo.can_delete);

    // Nothing readable references Priority any more.
    assert!(shape.model("Task").is_none());
    assert!(shape.enums.is_empty());
    assert!(shape.operations.contains_key("echo"));
}

#[test]
fn signed_in_shape_hides_guest_only_operations() {
    let shape = ClientShape::for_caller(&todo_graph(), &Caller::signed_in());
    assert!(shape.model("Todo").is_none());
    assert!(shape.model("Task").is_some());
    assert!(shape.enums.contains_key("Priority"));
    assert!(shape.operations.is_empty());
}

#[test]
fn foreign_keys_are_hidden_but_writable() {
    let graph = schema([
        (
            "Company",
            model()
                .field("name", string())
                .relationship("employees", has_many("Employee")),
        ),
        (
            "Employee",
            model()
                .field("name", string())
                .relationship("company", belongs_to("Company")),
        ),
    ])
    .build()
    .unwrap();
    let shape = ClientShape::derive(&graph);

    let employee = shape.model("Employee").unwrap();
    assert!(employee.field("companyId").is_none());
    let company = employee.field("company").unwrap();
    assert_eq!(company.ty, ShapeType::Model("Company".to_string()));
    assert!(!company.array);
    assert!(names(employee.create_input.as_ref().unwrap()).contains(&"companyId"));

    let employees = shape.model("Company").unwrap().field("employees").unwrap();
    assert_eq!(employees.ty, ShapeType::Model("Employee".to_string()));
    assert!(employees.array);
}

#[test]
fn many_to_many_surfaces_join_records() {
    let graph = schema([
        ("Post", model().relationship("tags", many_to_many("Tag"))),
        ("Tag", model().relationship("posts", many_to_many("Post"))),
    ])
    .build()
    .unwrap();
    let shape = ClientShape::derive(&graph);

    let tags = shape.model("Post").unwrap().field("tags").unwrap();
    assert_eq!(tags.ty, ShapeType::Model("PostTag".to_string()));
    assert!(tags.array);

    let join = shape.model("PostTag").unwrap();
    assert_eq!(join.identifier, ["postId", "tagId"]);
    assert!(join.field("postId").is_some());
}

#[test]
fn custom_types_reachable_from_operations_are_listed() {
    let graph = schema([(
        "locate",
        query()
            .argument("near", custom_type([("lat", float()), ("lng", float())]))
            .returns(custom_type([("label", string())]).field("kind", enumeration(["a", "b"]))),
    )])
    .build()
    .unwrap();
    let shape = ClientShape::derive(&graph);

    assert!(shape.custom_types.contains_key("Near"));
    assert!(shape.custom_types.contains_key("LocateReturnType"));
    assert!(shape.enums.contains_key("Kind"));
    let returns = shape.operations["locate"].returns.as_ref().unwrap();
    assert_eq!(returns.ty, ShapeType::CustomType("LocateReturnType".to_string()));
}

#[test]
fn shape_feeds_code_generation() {
    let shape = ClientShape::derive(&todo_graph());
    let code = codegen::generate(&shape);

    let models = code.file("models.ts").unwrap();
    assert!(models.contains("export type Todo = {"));
    assert!(models.contains("export type CreateTodoInput = {"));
    assert!(models.contains("export type UpdateTaskInput = {"));
    assert!(models.contains("export type DeleteTodoInput = { id: string };"));

    let types = code.file("types.ts").unwrap();
    assert!(types.contains("export type Priority = \"low\" | \"high\";"));

    let operations = code.file("operations.ts").unwrap();
    assert!(operations.contains("export type EchoArguments = { content: string };"));
}

#[test]
fn shape_serializes_with_camel_case_keys() {
    let shape = ClientShape::derive(&todo_graph());
    let json = serde_json::to_value(&shape).unwrap();

    let todo = &json["models"]["Todo"];
    assert!(todo["createInput"].is_array());
    assert_eq!(todo["canDelete"], true);
    assert_eq!(todo["fields"][0]["type"]["kind"], "scalar");
    assert!(json["customTypes"].is_object());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ModelSpec {
    fields: Vec<(FieldDescriptor, bool, bool)>,
    parent: Option<prop::sample::Index>,
    priority: bool,
    owned: bool,
}

fn arb_scalar() -> impl Strategy<Value = FieldDescriptor> {
    prop_oneof![
        Just(string()),
        Just(integer()),
        Just(float()),
        Just(boolean()),
        Just(datetime()),
        Just(email()),
        Just(url()),
    ]
}

fn arb_model() -> impl Strategy<Value = ModelSpec> {
    (
        prop::collection::vec((arb_scalar(), any::<bool>(), any::<bool>()), 0..4),
        prop::option::of(any::<prop::sample::Index>()),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(fields, parent, priority, owned)| ModelSpec {
            fields,
            parent,
            priority,
            owned,
        })
}

fn build_graph(specs: &[ModelSpec]) -> SchemaGraph {
    let mut builder = schema([("Priority", enumeration(["low", "high"]))]);
    for (i, spec) in specs.iter().enumerate() {
        let mut descriptor = model();
        for (j, (field, required, array)) in spec.fields.iter().enumerate() {
            let mut field = field.clone();
            if *required {
                field = field.required();
            }
            if *array {
                field = field.array();
            }
            descriptor = descriptor.field(format!("f{j}"), field);
        }
        if spec.priority {
            descriptor = descriptor.field("priority", reference("Priority"));
        }
        if let (Some(parent), true) = (&spec.parent, i > 0) {
            descriptor = descriptor.relationship("parent", belongs_to(format!("M{}", parent.index(i))));
        }
        if spec.owned {
            descriptor = descriptor.authorization([allow::owner()]);
        }
        builder.add(format!("M{i}"), descriptor).unwrap();
    }
    builder.authorization([allow::guest().to([Operation::Read])]).unwrap();
    builder.build().unwrap()
}

proptest! {
    #[test]
    fn derivation_is_deterministic(specs in prop::collection::vec(arb_model(), 1..6)) {
        let graph = build_graph(&specs);
        let first = ClientShape::derive(&graph);
        let second = ClientShape::derive(&graph);
        prop_assert_eq!(&first, &second);

        let rebuilt = ClientShape::derive(&build_graph(&specs));
        prop_assert_eq!(&first, &rebuilt);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&rebuilt).unwrap()
        );
    }

    #[test]
    fn caller_shape_is_a_subset(specs in prop::collection::vec(arb_model(), 1..6)) {
        let graph = build_graph(&specs);
        let full = ClientShape::derive(&graph);

        for caller in [Caller::guest(), Caller::signed_in().owner()] {
            let narrowed = ClientShape::for_caller(&graph, &caller);
            for (name, model) in &narrowed.models {
                let unrestricted = &full.models[name];
                for field in &model.fields {
                    prop_assert!(unrestricted.fields.contains(field));
                }
            }
            for name in narrowed.enums.keys() {
                prop_assert!(full.enums.contains_key(name));
            }
        }
    }

    #[test]
    fn foreign_keys_never_appear_as_fields(specs in prop::collection::vec(arb_model(), 2..6)) {
        let graph = build_graph(&specs);
        let shape = ClientShape::derive(&graph);

        for (i, spec) in specs.iter().enumerate() {
            let model = &shape.models[&format!("M{i}")];
            prop_assert!(model.field("parentId").is_none());
            if spec.parent.is_some() && i > 0 {
                prop_assert!(model.field("parent").is_some());
                let create = model.create_input.as_ref().unwrap();
                prop_assert!(create.iter().any(|f| f.name == "parentId"));
            }
            prop_assert_eq!(shape.enums.contains_key("Priority"), specs.iter().any(|s| s.priority));
        }
    }
}
