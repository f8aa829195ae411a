use crate::ast::expression::{Expression, Literal};
use indoc::indoc;

fn parse_to_string(source: &str) -> String {
  crate::parse_expression(source).unwrap().to_string()
}

fn definition_to_string(source: &str) -> String {
  crate::parse_definition(source).unwrap().to_string()
}

fn annotation_to_string(source: &str) -> String {
  crate::parse_type_annotation(source).unwrap().to_string()
}

#[test]
fn space_at_end() {
  assert!(crate::parse_expression("22 + 44 ").is_ok());
  assert!(crate::parse_expression("22 + 44    ").is_ok());
  assert!(crate::parse_expression("22 + 44  \t  ").is_ok());
  assert!(crate::parse_expression("22 + 44\n\n\n").is_ok());
}

#[test]
fn empty_string() {
  assert!(crate::parse_expression("").is_err());
  assert!(crate::parse_expression("    ").is_err());
  assert!(crate::parse_expression("  \n    \n ").is_err());
}

#[test]
fn literals() {
  assert_eq!(parse_to_string("42"), "Number (42)\n");
  assert_eq!(parse_to_string("0xFF"), "Number (255)\n");
  assert_eq!(parse_to_string("4.5"), "Float (4.5)\n");
  assert_eq!(parse_to_string("1.5e2"), "Float (150)\n");
  assert_eq!(parse_to_string("\"hello\""), "String \"hello\"\n");
  assert_eq!(parse_to_string("'a'"), "Char 'a'\n");
}

#[test]
fn booleans() {
  assert_eq!(parse_to_string("True"), "Boolean (True)\n");
  assert_eq!(parse_to_string("False"), "Boolean (False)\n");

  // only the unqualified names are boolean literals
  assert_eq!(parse_to_string("Basics.True"), "Variable (Basics.True)\n");
}

#[test]
fn variables() {
  assert_eq!(parse_to_string("x"), "Variable (x)\n");
  assert_eq!(parse_to_string("List.map"), "Variable (List.map)\n");
  assert_eq!(parse_to_string("Maybe.Just"), "Variable (Maybe.Just)\n");
  assert_eq!(parse_to_string("Json.Decode.field"), "Variable (Json.Decode.field)\n");
  assert_eq!(parse_to_string("(+)"), "Variable ((+))\n");
  assert_eq!(parse_to_string("(|>)"), "Variable ((|>))\n");
}

#[test]
fn string_escapes() {
  let expression = crate::parse_expression(r#""a\n\t\\\"""#).unwrap();
  match &expression.value.value {
    Expression::Literal(Literal::Str(value)) => assert_eq!(value, "a\n\t\\\""),
    _ => panic!("expected a string literal"),
  }

  let expression = crate::parse_expression(r#""\u{1F600}""#).unwrap();
  match &expression.value.value {
    Expression::Literal(Literal::Str(value)) => assert_eq!(value, "😀"),
    _ => panic!("expected a string literal"),
  }
}

#[test]
fn triple_quoted_strings() {
  let expression = crate::parse_expression("\"\"\"a\nb\"\"\"").unwrap();
  match &expression.value.value {
    Expression::Literal(Literal::Str(value)) => assert_eq!(value, "a\nb"),
    _ => panic!("expected a string literal"),
  }
}

#[test]
fn unterminated_literals() {
  assert!(crate::parse_expression("\"un").is_err());
  assert!(crate::parse_expression("'a").is_err());
  assert!(crate::parse_expression("{- unclosed").is_err());
  assert!(crate::parse_expression("[glsl| vec4").is_err());

  // an escape as the very last byte must not read past the input
  assert!(crate::parse_expression("\"\\").is_err());
  assert!(crate::parse_expression("\"a\\").is_err());
  assert!(crate::parse_expression("\"\"\"a\\").is_err());
  assert!(crate::parse_expression("'\\").is_err());
}

#[test]
fn unknown_character() {
  assert!(crate::parse_expression("¬").is_err());
  assert!(crate::parse_expression("🤗").is_err());

  // unknown characters in strings are fine
  assert!(crate::parse_expression("\"¬\"").is_ok());
  assert!(crate::parse_expression("'🤗'").is_ok());
}

#[test]
fn operator_chains_stay_flat() {
  assert_eq!(
    parse_to_string("a + b * c"),
    indoc! {"
      Binops (JoinAll)
        Variable (a)
        Operator (+)
        Variable (b)
        Operator (*)
        Variable (c)
    "}
  );
  assert_eq!(
    parse_to_string("x :: xs"),
    indoc! {"
      Binops (JoinAll)
        Variable (x)
        Operator (::)
        Variable (xs)
    "}
  );
  assert_eq!(
    parse_to_string("a |> b |> c"),
    indoc! {"
      Binops (JoinAll)
        Variable (a)
        Operator (|>)
        Variable (b)
        Operator (|>)
        Variable (c)
    "}
  );
}

#[test]
fn operator_chain_layout() {
  assert!(parse_to_string("a + b").starts_with("Binops (JoinAll)"));
  assert!(parse_to_string("a +\n  b").starts_with("Binops (SplitAll)"));
  assert!(parse_to_string("a\n  + b").starts_with("Binops (SplitAll)"));
}

#[test]
fn operator_without_operand() {
  assert!(crate::parse_expression("a +").is_err());
  assert!(crate::parse_expression("a + *").is_err());
}

#[test]
fn control_flow_closes_an_operator_chain() {
  assert_eq!(
    parse_to_string("a + \\x -> x"),
    indoc! {"
      Binops (JoinAll)
        Variable (a)
        Operator (+)
        Lambda
          Pattern (x)
          Body
            Variable (x)
    "}
  );
}

#[test]
fn application() {
  assert_eq!(
    parse_to_string("f x y"),
    indoc! {"
      App (JoinFirst JoinAll)
        Variable (f)
        Variable (x)
        Variable (y)
    "}
  );
  assert_eq!(
    parse_to_string("f (g x)"),
    indoc! {"
      App (JoinFirst JoinAll)
        Variable (f)
        Parens
          App (JoinFirst JoinAll)
            Variable (g)
            Variable (x)
    "}
  );

  // a lone term is never wrapped in an application node
  assert_eq!(parse_to_string("f"), "Variable (f)\n");
}

#[test]
fn application_layout() {
  assert!(parse_to_string("f x y").starts_with("App (JoinFirst JoinAll)"));
  assert!(parse_to_string("f x\n  y").starts_with("App (JoinFirst SplitAll)"));
  assert!(parse_to_string("f\n  x y").starts_with("App (SplitFirst)"));

  // an internally multiline first argument also splits from the function
  assert!(parse_to_string("f [ 1\n  , 2 ]").starts_with("App (SplitFirst)"));
}

#[test]
fn negation() {
  assert_eq!(
    parse_to_string("-x"),
    indoc! {"
      Negative
        Variable (x)
    "}
  );

  // adjacency decides between subtraction and applying a negated term
  assert_eq!(
    parse_to_string("a - b"),
    indoc! {"
      Binops (JoinAll)
        Variable (a)
        Operator (-)
        Variable (b)
    "}
  );
  assert_eq!(
    parse_to_string("a-b"),
    indoc! {"
      Binops (JoinAll)
        Variable (a)
        Operator (-)
        Variable (b)
    "}
  );
  assert_eq!(
    parse_to_string("a -b"),
    indoc! {"
      App (JoinFirst JoinAll)
        Variable (a)
        Negative
          Variable (b)
    "}
  );
}

#[test]
fn if_expression() {
  assert_eq!(
    parse_to_string("if a then b else c"),
    indoc! {"
      If
        Condition
          Variable (a)
        Then
          Variable (b)
        Else
          Variable (c)
    "}
  );
}

#[test]
fn else_if_stays_flat() {
  assert_eq!(
    parse_to_string("if a then b else if c then d else e"),
    indoc! {"
      If
        Condition
          Variable (a)
        Then
          Variable (b)
        Condition
          Variable (c)
        Then
          Variable (d)
        Else
          Variable (e)
    "}
  );
}

#[test]
fn if_requires_else() {
  assert!(crate::parse_expression("if a then b").is_err());
  assert!(crate::parse_expression("if a b else c").is_err());
}

#[test]
fn case_expression() {
  assert_eq!(
    parse_to_string("case x of\n  Just y -> y\n  Nothing -> 0"),
    indoc! {"
      Case
        Variable (x)
        Branch
          Data (Just)
            Pattern (y)
          Variable (y)
        Branch
          Data (Nothing)
          Number (0)
    "}
  );
}

#[test]
fn case_branches_align_to_the_first() {
  assert!(crate::parse_expression("case x of\n  A -> 1\n  B -> 2").is_ok());
  assert!(crate::parse_expression("case x of\n  A -> 1\n B -> 2").is_err());
  assert!(crate::parse_expression("case x of\n  A -> 1\n   B -> 2").is_err());
  assert!(crate::parse_expression("case x of").is_err());
}

#[test]
fn case_multiline_scrutinee() {
  assert_eq!(
    parse_to_string("case foo\n  bar of\n  A -> 1"),
    indoc! {"
      Case (multiline)
        App (SplitFirst)
          Variable (foo)
          Variable (bar)
        Branch
          Data (A)
          Number (1)
    "}
  );
}

#[test]
fn case_branch_bodies_continue_past_their_column() {
  assert_eq!(
    parse_to_string("case n of\n  0 ->\n    a\n  _ ->\n    b"),
    indoc! {"
      Case
        Variable (n)
        Branch
          Number (0)
          Variable (a)
        Branch
          Anything
          Variable (b)
    "}
  );
}

#[test]
fn let_expression() {
  assert_eq!(
    parse_to_string("let\n  x = 1\n  y = 2\nin x + y"),
    indoc! {"
      Let
        Definition
          Pattern (x)
          Body
            Number (1)
        Definition
          Pattern (y)
          Body
            Number (2)
        In
          Binops (JoinAll)
            Variable (x)
            Operator (+)
            Variable (y)
    "}
  );
}

#[test]
fn let_with_annotation() {
  assert_eq!(
    parse_to_string("let\n  x : Int\n  x = 1\nin x"),
    indoc! {"
      Let
        Annotation (x)
          TypeConstruction (Int)
        Definition
          Pattern (x)
          Body
            Number (1)
        In
          Variable (x)
    "}
  );
}

#[test]
fn let_requires_a_declaration_and_a_body() {
  assert!(crate::parse_expression("let in x").is_err());
  assert!(crate::parse_expression("let\n  x = 1").is_err());
  assert!(crate::parse_expression("let\n  x = 1\nx").is_err());
}

#[test]
fn let_declarations_align_to_the_first() {
  assert!(crate::parse_expression("let\n  x = 1\n  y = 2\nin x").is_ok());
  assert!(crate::parse_expression("let\n  x = 1\n   y = 2\nin x").is_err());
}

#[test]
fn let_body_continuation_indentation() {
  // a continuation line of a declaration body must be indented past the
  // declaration's own column
  assert!(crate::parse_expression("let\n  f = g\n   h\nin f").is_ok());
  assert!(crate::parse_expression("let\n  f = g\n  h\nin f").is_err());
}

#[test]
fn lambda() {
  assert_eq!(
    parse_to_string("\\a b -> a"),
    indoc! {"
      Lambda
        Pattern (a)
        Pattern (b)
        Body
          Variable (a)
    "}
  );
  assert_eq!(
    parse_to_string("\\x ->\n  x"),
    indoc! {"
      Lambda (multiline)
        Pattern (x)
        Body
          Variable (x)
    "}
  );
  assert!(crate::parse_expression("\\ -> x").is_err());
}

#[test]
fn lambda_glyph() {
  assert_eq!(parse_to_string("λx -> x"), parse_to_string("\\x -> x"));
}

#[test]
fn lists() {
  assert_eq!(parse_to_string("[]"), "List (JoinAll)\n");
  assert_eq!(
    parse_to_string("[1, 2, 3]"),
    indoc! {"
      List (JoinAll)
        Number (1)
        Number (2)
        Number (3)
    "}
  );
  assert!(parse_to_string("[ 1\n, 2\n]").starts_with("List (SplitAll)"));
  assert!(crate::parse_expression("[1, 2").is_err());
  assert!(crate::parse_expression("[1,, 2]").is_err());
}

#[test]
fn ranges() {
  assert_eq!(
    parse_to_string("[1..10]"),
    indoc! {"
      Range (JoinAll)
        Number (1)
        Number (10)
    "}
  );
  assert_eq!(
    parse_to_string("[ a .. b ]"),
    indoc! {"
      Range (JoinAll)
        Variable (a)
        Variable (b)
    "}
  );
  assert!(crate::parse_expression("[1..]").is_err());
}

#[test]
fn tuples_and_parens() {
  assert_eq!(
    parse_to_string("(1, 2)"),
    indoc! {"
      Tuple (JoinAll)
        Number (1)
        Number (2)
    "}
  );
  assert_eq!(
    parse_to_string("(x)"),
    indoc! {"
      Parens
        Variable (x)
    "}
  );
  assert_eq!(parse_to_string("()"), "Unit\n");
  assert_eq!(parse_to_string("(,)"), "TupleFunction (2)\n");
  assert_eq!(parse_to_string("(,,)"), "TupleFunction (3)\n");
  assert!(crate::parse_expression("(x").is_err());
}

#[test]
fn records() {
  assert_eq!(parse_to_string("{}"), "Record (JoinAll)\n");
  assert_eq!(
    parse_to_string("{ x = 1, y = 2 }"),
    indoc! {"
      Record (JoinAll)
        Field (x)
          Number (1)
        Field (y)
          Number (2)
    "}
  );
  assert_eq!(
    parse_to_string("{ point | x = 1 }"),
    indoc! {"
      Record (JoinAll)
        Base (point)
        Field (x)
          Number (1)
    "}
  );
  assert!(parse_to_string("{ x = 1\n, y = 2\n}").starts_with("Record (SplitAll)"));
  assert!(crate::parse_expression("{ x = }").is_err());
  assert!(crate::parse_expression("{ x = 1").is_err());
}

#[test]
fn record_access() {
  assert_eq!(
    parse_to_string("point.x"),
    indoc! {"
      Access (x)
        Variable (point)
    "}
  );
  assert_eq!(
    parse_to_string("point.x.y"),
    indoc! {"
      Access (y)
        Access (x)
          Variable (point)
    "}
  );
  assert_eq!(parse_to_string(".name"), "AccessFunction (.name)\n");

  // access requires adjacency, `x .y` applies an accessor function instead
  assert_eq!(
    parse_to_string("List.map .name people"),
    indoc! {"
      App (JoinFirst JoinAll)
        Variable (List.map)
        AccessFunction (.name)
        Variable (people)
    "}
  );
}

#[test]
fn shader_blocks() {
  let expression = crate::parse_expression("[glsl|precision mediump float;|]").unwrap();
  match &expression.value.value {
    Expression::GlShader(contents) => assert_eq!(contents, "precision mediump float;"),
    _ => panic!("expected a shader block"),
  }

  // carriage returns are stripped from the shader source
  let expression = crate::parse_expression("[glsl|a\r\nb|]").unwrap();
  match &expression.value.value {
    Expression::GlShader(contents) => assert_eq!(contents, "a\nb"),
    _ => panic!("expected a shader block"),
  }
}

#[test]
fn comments_around_an_expression() {
  assert_eq!(
    parse_to_string("-- before\n1 -- after"),
    indoc! {"
      Comment \" before\"
      Number (1)
      Comment \" after\"
    "}
  );
}

#[test]
fn comments_in_collections() {
  assert_eq!(
    parse_to_string("[ {- a -} 1 {- b -}, {- c -} 2 {- d -} ]"),
    indoc! {"
      List (JoinAll)
        Comment \" a \"
        Number (1)
        Comment \" b \"
        Comment \" c \"
        Number (2)
        Comment \" d \"
    "}
  );
  assert_eq!(
    parse_to_string("( {- hi -} )"),
    indoc! {"
      Unit
        Comment \" hi \"
    "}
  );
  assert_eq!(
    parse_to_string("{ {- empty -} }"),
    indoc! {"
      Record (JoinAll)
        Comment \" empty \"
    "}
  );
  assert_eq!(
    parse_to_string("[ {- nothing -} ]"),
    indoc! {"
      List (JoinAll)
        Comment \" nothing \"
    "}
  );
}

#[test]
fn comments_in_ranges() {
  assert_eq!(
    parse_to_string("[ {- a -} 1 {- b -} .. {- c -} 10 {- d -} ]"),
    indoc! {"
      Range (JoinAll)
        Comment \" a \"
        Number (1)
        Comment \" b \"
        Comment \" c \"
        Number (10)
        Comment \" d \"
    "}
  );
}

#[test]
fn comments_in_a_let() {
  assert_eq!(
    parse_to_string("let\n  -- c1\n  x {- c2 -} = {- c3 -} 1 -- c4\nin\n-- c5\nx"),
    indoc! {"
      Let
        Comment \" c1\"
        Definition
          Pattern (x)
          Comment \" c2 \"
          Body
            Comment \" c3 \"
            Number (1)
        Comment \" c4\"
        In
          Comment \" c5\"
          Variable (x)
    "}
  );
}

#[test]
fn nested_block_comments() {
  assert_eq!(
    parse_to_string("{- a {- b -} c -} 1"),
    indoc! {"
      Comment \" a {- b -} c \"
      Number (1)
    "}
  );
}

#[test]
fn comments_between_application_arguments() {
  assert_eq!(
    parse_to_string("f {- arg -} x"),
    indoc! {"
      App (JoinFirst JoinAll)
        Variable (f)
        Comment \" arg \"
        Variable (x)
    "}
  );
}

#[test]
fn comments_around_operators() {
  assert_eq!(
    parse_to_string("a {- l -} + {- r -} b"),
    indoc! {"
      Binops (JoinAll)
        Variable (a)
        Comment \" l \"
        Operator (+)
        Comment \" r \"
        Variable (b)
    "}
  );
}

#[test]
fn definitions() {
  assert_eq!(
    parse_to_string("let\n  double x = x * 2\nin double 4"),
    indoc! {"
      Let
        Definition
          Pattern (double)
          Pattern (x)
          Body
            Binops (JoinAll)
              Variable (x)
              Operator (*)
              Number (2)
        In
          App (JoinFirst JoinAll)
            Variable (double)
            Number (4)
    "}
  );
  assert_eq!(
    definition_to_string("double x = x * 2"),
    indoc! {"
      Definition
        Pattern (double)
        Pattern (x)
        Body
          Binops (JoinAll)
            Variable (x)
            Operator (*)
            Number (2)
    "}
  );
}

#[test]
fn operator_definitions() {
  assert_eq!(
    definition_to_string("(+) a b = add a b"),
    indoc! {"
      Definition
        Pattern ((+))
        Pattern (a)
        Pattern (b)
        Body
          App (JoinFirst JoinAll)
            Variable (add)
            Variable (a)
            Variable (b)
    "}
  );
}

#[test]
fn destructuring_definitions_take_no_arguments() {
  assert_eq!(
    definition_to_string("(a, b) = pair"),
    indoc! {"
      Definition
        TuplePattern
          Pattern (a)
          Pattern (b)
        Body
          Variable (pair)
    "}
  );
  assert_eq!(
    definition_to_string("{ x, y } = point"),
    indoc! {"
      Definition
        RecordPattern
          Field (x)
          Field (y)
        Body
          Variable (point)
    "}
  );
  assert_eq!(
    definition_to_string("_ = ignored"),
    indoc! {"
      Definition
        Anything
        Body
          Variable (ignored)
    "}
  );

  // only variable and operator heads may take arguments
  assert!(crate::parse_definition("(a, b) c = pair").is_err());
}

#[test]
fn patterns() {
  assert_eq!(
    parse_to_string("case xs of\n  x :: rest -> x\n  [] -> y"),
    indoc! {"
      Case
        Variable (xs)
        Branch
          Cons
            Pattern (x)
            Pattern (rest)
          Variable (x)
        Branch
          ListPattern
          Variable (y)
    "}
  );
  assert_eq!(
    parse_to_string("case p of\n  (x, y) as point -> x"),
    indoc! {"
      Case
        Variable (p)
        Branch
          Alias (point)
            TuplePattern
              Pattern (x)
              Pattern (y)
          Variable (x)
    "}
  );
  assert_eq!(
    parse_to_string("case x of\n  Maybe.Just y -> y\n  _ -> z"),
    indoc! {"
      Case
        Variable (x)
        Branch
          Data (Maybe.Just)
            Pattern (y)
          Variable (y)
        Branch
          Anything
          Variable (z)
    "}
  );
}

#[test]
fn literal_patterns() {
  assert_eq!(
    parse_to_string("case n of\n  0 -> a\n  \"s\" -> b\n  _ -> c"),
    indoc! {"
      Case
        Variable (n)
        Branch
          Number (0)
          Variable (a)
        Branch
          String \"s\"
          Variable (b)
        Branch
          Anything
          Variable (c)
    "}
  );
}

#[test]
fn type_annotations() {
  assert_eq!(
    annotation_to_string("x : Int"),
    indoc! {"
      Annotation (x)
        TypeConstruction (Int)
    "}
  );
  assert_eq!(
    annotation_to_string("map : (a -> b) -> List a -> List b"),
    indoc! {"
      Annotation (map)
        FunctionType (JoinAll)
          Parens
            FunctionType (JoinAll)
              TypeVariable (a)
              TypeVariable (b)
          TypeConstruction (List)
            TypeVariable (a)
          TypeConstruction (List)
            TypeVariable (b)
    "}
  );
  assert_eq!(
    annotation_to_string("(+) : Int -> Int -> Int"),
    indoc! {"
      Annotation ((+))
        FunctionType (JoinAll)
          TypeConstruction (Int)
          TypeConstruction (Int)
          TypeConstruction (Int)
    "}
  );
  assert!(crate::parse_type_annotation("x : ").is_err());
  assert!(crate::parse_type_annotation("X : Int").is_err());
}

#[test]
fn record_types() {
  assert_eq!(
    annotation_to_string("point : { x : Int, y : Int }"),
    indoc! {"
      Annotation (point)
        RecordType (JoinAll)
          Field (x)
            TypeConstruction (Int)
          Field (y)
            TypeConstruction (Int)
    "}
  );
  assert_eq!(
    annotation_to_string("getX : { r | x : Int } -> Int"),
    indoc! {"
      Annotation (getX)
        FunctionType (JoinAll)
          RecordType (JoinAll)
            Base (r)
            Field (x)
              TypeConstruction (Int)
          TypeConstruction (Int)
    "}
  );
}

#[test]
fn tuple_and_unit_types() {
  assert_eq!(
    annotation_to_string("pair : (Int, String)"),
    indoc! {"
      Annotation (pair)
        TupleType
          TypeConstruction (Int)
          TypeConstruction (String)
    "}
  );
  assert_eq!(
    annotation_to_string("unit : ()"),
    indoc! {"
      Annotation (unit)
        UnitType
    "}
  );
  assert_eq!(
    annotation_to_string("withDefault : a -> Maybe a -> a"),
    indoc! {"
      Annotation (withDefault)
        FunctionType (JoinAll)
          TypeVariable (a)
          TypeConstruction (Maybe)
            TypeVariable (a)
          TypeVariable (a)
    "}
  );
}

#[test]
fn error_messages() {
  let error = crate::parse_expression("f (x").unwrap_err();
  assert_eq!(error.message(), "expected ) but got End of File");

  let error = crate::parse_expression("").unwrap_err();
  assert_eq!(error.expected(), "an expression");
}

#[test]
fn whole_input_must_be_consumed() {
  assert!(crate::parse_expression("1 ;").is_err());
  assert!(crate::parse_definition("x = 1 = 2").is_err());
}

#[test]
fn tokens_carry_lines_and_columns() {
  let tokens: Vec<_> = crate::tokenise("f x\n  y").collect();
  let positions: Vec<_> = tokens.iter().map(|token| (token.line, token.column)).collect();
  assert_eq!(positions, [(1, 1), (1, 3), (2, 3), (2, 4)]);
}

#[test]
fn reserved_symbols_split_out_of_operator_runs() {
  use crate::TokenKind;

  let kinds: Vec<_> = crate::tokenise("= -> : | . .. :: |> ==")
    .map(|token| token.kind)
    .collect();
  assert_eq!(
    kinds,
    [
      TokenKind::Equals,
      TokenKind::RightArrow,
      TokenKind::Colon,
      TokenKind::Pipe,
      TokenKind::Dot,
      TokenKind::DotDot,
      TokenKind::Operator,
      TokenKind::Operator,
      TokenKind::Operator,
      TokenKind::EndOfFile,
    ]
  );
}
