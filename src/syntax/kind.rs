//! The closed set of node kinds shared by every grammar backend.
//!
//! Grammar-specific spellings are folded here so nothing downstream ever
//! looks at a raw tree-sitter kind string.

/// Normalized node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,

    // Declarations
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    MethodDefinition,
    /// Overload, abstract or interface signature: parameters but no body.
    FunctionSignature,
    ClassDeclaration,
    ClassExpression,
    ClassBody,
    FieldDefinition,
    ExportStatement,
    ImportStatement,

    // Parameters and patterns
    FormalParameters,
    Parameter,
    ObjectPattern,
    ArrayPattern,
    PairPattern,
    AssignmentPattern,
    ShorthandAssignmentPattern,
    RestPattern,
    Decorator,
    TypeAnnotation,

    // Expressions
    AssignmentExpression,
    AugmentedAssignment,
    BinaryExpression,
    UnaryExpression,
    UpdateExpression,
    TernaryExpression,
    ParenthesizedExpression,
    AwaitExpression,
    TypeCast,
    NonNullExpression,
    CallExpression,
    NewExpression,
    Arguments,
    MemberExpression,
    SubscriptExpression,
    OptionalChain,
    SpreadElement,
    SequenceExpression,
    YieldExpression,
    Jsx,

    // Literals and names
    ObjectLiteral,
    Pair,
    ComputedPropertyName,
    ArrayLiteral,
    String,
    TemplateString,
    TemplateSubstitution,
    Number,
    Regex,
    True,
    False,
    Null,
    Undefined,
    Identifier,
    PropertyIdentifier,
    ShorthandProperty,
    ShorthandPatternProperty,
    This,
    Super,

    // Statements
    StatementBlock,
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    ElseClause,
    LoopStatement,
    SwitchStatement,
    SwitchCase,
    TryStatement,
    ThrowStatement,
    StaticBlock,
    OtherStatement,

    Comment,
    Error,
    /// Anonymous token such as punctuation, keywords and operators.
    Token,
    /// Named node with no dedicated kind.
    Other,
}

impl NodeKind {
    /// Fold a grammar node kind into the shared set.
    pub fn from_grammar(kind: &str, named: bool) -> Self {
        if !named {
            return NodeKind::Token;
        }
        match kind {
            "program" => NodeKind::Program,

            "lexical_declaration" | "variable_declaration" => NodeKind::VariableDeclaration,
            "variable_declarator" => NodeKind::VariableDeclarator,
            "function_declaration" | "generator_function_declaration" => {
                NodeKind::FunctionDeclaration
            }
            "function_expression" | "function" | "generator_function" => {
                NodeKind::FunctionExpression
            }
            "arrow_function" => NodeKind::ArrowFunction,
            "method_definition" => NodeKind::MethodDefinition,
            "function_signature" | "method_signature" | "abstract_method_signature" => {
                NodeKind::FunctionSignature
            }
            "class_declaration" | "abstract_class_declaration" => NodeKind::ClassDeclaration,
            "class" => NodeKind::ClassExpression,
            "class_body" => NodeKind::ClassBody,
            "field_definition" | "public_field_definition" => NodeKind::FieldDefinition,
            "export_statement" => NodeKind::ExportStatement,
            "import_statement" => NodeKind::ImportStatement,

            "formal_parameters" => NodeKind::FormalParameters,
            "required_parameter" | "optional_parameter" => NodeKind::Parameter,
            "object_pattern" => NodeKind::ObjectPattern,
            "array_pattern" => NodeKind::ArrayPattern,
            "pair_pattern" => NodeKind::PairPattern,
            "assignment_pattern" => NodeKind::AssignmentPattern,
            "object_assignment_pattern" => NodeKind::ShorthandAssignmentPattern,
            "rest_pattern" => NodeKind::RestPattern,
            "decorator" => NodeKind::Decorator,
            "type_annotation" | "return_type" | "type_arguments" | "type_parameters" => {
                NodeKind::TypeAnnotation
            }

            "assignment_expression" => NodeKind::AssignmentExpression,
            "augmented_assignment_expression" => NodeKind::AugmentedAssignment,
            "binary_expression" => NodeKind::BinaryExpression,
            "unary_expression" => NodeKind::UnaryExpression,
            "update_expression" => NodeKind::UpdateExpression,
            "ternary_expression" => NodeKind::TernaryExpression,
            "parenthesized_expression" => NodeKind::ParenthesizedExpression,
            "await_expression" => NodeKind::AwaitExpression,
            "as_expression" | "satisfies_expression" | "type_assertion" => NodeKind::TypeCast,
            "non_null_expression" => NodeKind::NonNullExpression,
            "call_expression" => NodeKind::CallExpression,
            "new_expression" => NodeKind::NewExpression,
            "arguments" => NodeKind::Arguments,
            "member_expression" => NodeKind::MemberExpression,
            "subscript_expression" => NodeKind::SubscriptExpression,
            "optional_chain" => NodeKind::OptionalChain,
            "spread_element" => NodeKind::SpreadElement,
            "sequence_expression" => NodeKind::SequenceExpression,
            "yield_expression" => NodeKind::YieldExpression,
            "jsx_element" | "jsx_self_closing_element" | "jsx_fragment" => NodeKind::Jsx,

            "object" => NodeKind::ObjectLiteral,
            "pair" => NodeKind::Pair,
            "computed_property_name" => NodeKind::ComputedPropertyName,
            "array" => NodeKind::ArrayLiteral,
            "string" => NodeKind::String,
            "template_string" => NodeKind::TemplateString,
            "template_substitution" => NodeKind::TemplateSubstitution,
            "number" => NodeKind::Number,
            "regex" => NodeKind::Regex,
            "true" => NodeKind::True,
            "false" => NodeKind::False,
            "null" => NodeKind::Null,
            "undefined" => NodeKind::Undefined,
            "identifier" => NodeKind::Identifier,
            "property_identifier" | "private_property_identifier" => NodeKind::PropertyIdentifier,
            "shorthand_property_identifier" => NodeKind::ShorthandProperty,
            "shorthand_property_identifier_pattern" => NodeKind::ShorthandPatternProperty,
            "this" => NodeKind::This,
            "super" => NodeKind::Super,

            "statement_block" => NodeKind::StatementBlock,
            "expression_statement" => NodeKind::ExpressionStatement,
            "return_statement" => NodeKind::ReturnStatement,
            "if_statement" => NodeKind::IfStatement,
            "else_clause" => NodeKind::ElseClause,
            "for_statement" | "for_in_statement" | "while_statement" | "do_statement" => {
                NodeKind::LoopStatement
            }
            "switch_statement" => NodeKind::SwitchStatement,
            "switch_case" | "switch_default" => NodeKind::SwitchCase,
            "try_statement" => NodeKind::TryStatement,
            "throw_statement" => NodeKind::ThrowStatement,
            "class_static_block" => NodeKind::StaticBlock,
            "break_statement" | "continue_statement" | "empty_statement" | "labeled_statement"
            | "debugger_statement" | "with_statement" => NodeKind::OtherStatement,

            "comment" | "html_comment" => NodeKind::Comment,
            "ERROR" => NodeKind::Error,
            _ => NodeKind::Other,
        }
    }

    /// Any function form that owns a parameter list.
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::FunctionExpression
                | NodeKind::ArrowFunction
                | NodeKind::MethodDefinition
        )
    }

    /// Literal values that need no further evaluation.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            NodeKind::String
                | NodeKind::Number
                | NodeKind::Regex
                | NodeKind::True
                | NodeKind::False
                | NodeKind::Null
                | NodeKind::Undefined
        )
    }

    /// Kinds that hold an ordered list of statements.
    pub fn is_statement_list(&self) -> bool {
        matches!(
            self,
            NodeKind::Program | NodeKind::StatementBlock | NodeKind::SwitchCase | NodeKind::StaticBlock
        )
    }

    /// Property paths: `a.b`, `a?.b`, `a[0]`.
    pub fn is_member_access(&self) -> bool {
        matches!(self, NodeKind::MemberExpression | NodeKind::SubscriptExpression)
    }

    /// Wrappers that do not change which value an expression denotes.
    pub fn is_transparent(&self) -> bool {
        matches!(
            self,
            NodeKind::ParenthesizedExpression | NodeKind::TypeCast | NodeKind::NonNullExpression
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, NodeKind::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_spellings_fold_together() {
        assert_eq!(
            NodeKind::from_grammar("lexical_declaration", true),
            NodeKind::from_grammar("variable_declaration", true)
        );
        assert_eq!(NodeKind::from_grammar("required_parameter", true), NodeKind::Parameter);
        assert_eq!(NodeKind::from_grammar("satisfies_expression", true), NodeKind::TypeCast);
        assert_eq!(
            NodeKind::from_grammar("abstract_method_signature", true),
            NodeKind::FunctionSignature
        );
        assert_eq!(NodeKind::from_grammar("(", false), NodeKind::Token);
        assert_eq!(NodeKind::from_grammar("glimmer_template", true), NodeKind::Other);
    }

    #[test]
    fn test_predicates() {
        assert!(NodeKind::ArrowFunction.is_function());
        assert!(!NodeKind::ClassDeclaration.is_function());
        assert!(!NodeKind::FunctionSignature.is_function());
        assert!(NodeKind::StatementBlock.is_statement_list());
        assert!(NodeKind::Undefined.is_literal());
    }
}
