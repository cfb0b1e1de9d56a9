use super::*;

#[test]
fn test_prototype() {
    let nodes = parse_ok("double mix(int a, double b);");
    match &nodes[0] {
        Node::Decl(Declaration::Prototype(proto)) => {
            assert_eq!(proto.name, "mix");
            assert_eq!(proto.return_type, SemanticType::Float64);
            assert_eq!(
                proto.param_types().collect::<Vec<_>>(),
                [SemanticType::Int32, SemanticType::Float64]
            );
            assert_eq!(proto.params[1].name, "b");
        }
        other => panic!("expected prototype, got {:?}", other),
    }
}

#[test]
fn test_empty_parameter_list() {
    let nodes = parse_ok("int zero();");
    match &nodes[0] {
        Node::Decl(Declaration::Prototype(proto)) => assert_eq!(proto.arity(), 0),
        other => panic!("expected prototype, got {:?}", other),
    }
}

#[test]
fn test_function_definition_with_return() {
    let nodes = parse_ok("int add(int a, int b) { return a + b; }");
    match &nodes[0] {
        Node::Decl(Declaration::Function(def)) => {
            assert_eq!(def.prototype.name, "add");
            assert!(def.body.is_empty());
            let ret = def.return_expr.as_ref().expect("return expression");
            assert_eq!(render(ret), "(a + b)");
            assert_eq!(ret.ty(), SemanticType::Int32);
        }
        other => panic!("expected definition, got {:?}", other),
    }
}

#[test]
fn test_function_body_statements() {
    let nodes = parse_ok("double f(double x) { double y = 2.0; int n; x * y; return x + y; }");
    match &nodes[0] {
        Node::Decl(Declaration::Function(def)) => {
            assert_eq!(def.body.len(), 3);
            assert!(matches!(
                &def.body[0],
                Stmt::Declaration(Declaration::VariableDefinition {
                    init: Initializer::Float(v),
                    ..
                }) if *v == 2.0
            ));
            assert!(matches!(
                &def.body[1],
                Stmt::Declaration(Declaration::VariableDeclaration { name, .. }) if name == "n"
            ));
            assert!(matches!(&def.body[2], Stmt::Expression(_)));
        }
        other => panic!("expected definition, got {:?}", other),
    }
}

#[test]
fn test_function_without_return() {
    let nodes = parse_ok("int noop() { }");
    match &nodes[0] {
        Node::Decl(Declaration::Function(def)) => assert!(def.return_expr.is_none()),
        other => panic!("expected definition, got {:?}", other),
    }
}

#[test]
fn test_recursive_reference_resolves() {
    let nodes = parse_ok("int fact(int n) { return if (n < 1) 1 else n * fact(n - 1); }");
    assert_eq!(nodes.len(), 1);
}

#[test]
fn test_variable_forms() {
    let nodes = parse_ok("int x; int y = 4; double z = 0.5;");
    assert!(matches!(
        &nodes[0],
        Node::Decl(Declaration::VariableDeclaration { ty: SemanticType::Int32, name, .. }) if name == "x"
    ));
    assert!(matches!(
        &nodes[1],
        Node::Decl(Declaration::VariableDefinition { init: Initializer::Int(4), .. })
    ));
    assert!(matches!(
        &nodes[2],
        Node::Decl(Declaration::VariableDefinition { ty: SemanticType::Float64, .. })
    ));
}

#[test]
fn test_float_keyword_is_double_precision() {
    let nodes = parse_ok("float half(float x);");
    match &nodes[0] {
        Node::Decl(Declaration::Prototype(proto)) => {
            assert_eq!(proto.return_type, SemanticType::Float64);
        }
        other => panic!("expected prototype, got {:?}", other),
    }
}

#[test]
fn test_parameter_scope_is_per_function() {
    let (_, errors) = parse_all("int f(int a) { return a; } a;");
    assert!(matches!(
        errors.as_slice(),
        [ParseError::UnknownIdentifier { name, .. }] if name == "a"
    ));
}

#[test]
fn test_include_is_skipped() {
    let nodes = parse_ok("include stdio; 1;");
    assert_eq!(nodes.len(), 1);
    assert!(matches!(&nodes[0], Node::Anon(_)));
}
