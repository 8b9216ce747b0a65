//! The closed set of Go syntax node kinds the walker understands
//!
//! Every named node the Go grammar can produce maps to exactly one
//! [`NodeKind`]. A named node outside this set is a [`TraversalDefect`]: the
//! table is incomplete relative to the grammar, which is a bug in this crate
//! rather than a problem with the input.

use std::fmt;

use tree_sitter::Node;

macro_rules! node_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// Named node kinds of the Go grammar
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($variant,)*
        }

        impl NodeKind {
            /// Every kind, in declaration order
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$variant,)*];

            /// Look up a kind by its grammar name
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(NodeKind::$variant),)*
                    _ => None,
                }
            }

            /// The grammar name of this kind
            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$variant => $name,)*
                }
            }
        }
    };
}

node_kinds! {
    // Identifiers
    Identifier => "identifier",
    FieldIdentifier => "field_identifier",
    TypeIdentifier => "type_identifier",
    PackageIdentifier => "package_identifier",
    LabelName => "label_name",
    BlankIdentifier => "blank_identifier",
    Dot => "dot",
    Nil => "nil",
    True => "true",
    False => "false",
    Iota => "iota",

    // Placeholder for unparseable input
    Error => "ERROR",

    // Literals
    IntLiteral => "int_literal",
    FloatLiteral => "float_literal",
    ImaginaryLiteral => "imaginary_literal",
    RuneLiteral => "rune_literal",
    InterpretedStringLiteral => "interpreted_string_literal",
    RawStringLiteral => "raw_string_literal",
    InterpretedStringLiteralContent => "interpreted_string_literal_content",
    RawStringLiteralContent => "raw_string_literal_content",
    EscapeSequence => "escape_sequence",

    Comment => "comment",

    // Files and declarations
    SourceFile => "source_file",
    PackageClause => "package_clause",
    ImportDeclaration => "import_declaration",
    ImportSpec => "import_spec",
    ImportSpecList => "import_spec_list",
    ConstDeclaration => "const_declaration",
    ConstSpec => "const_spec",
    VarDeclaration => "var_declaration",
    VarSpec => "var_spec",
    VarSpecList => "var_spec_list",
    TypeDeclaration => "type_declaration",
    TypeSpec => "type_spec",
    TypeAlias => "type_alias",
    FunctionDeclaration => "function_declaration",
    MethodDeclaration => "method_declaration",

    // Fields and parameters
    ParameterList => "parameter_list",
    ParameterDeclaration => "parameter_declaration",
    VariadicParameterDeclaration => "variadic_parameter_declaration",
    TypeParameterList => "type_parameter_list",
    TypeParameterDeclaration => "type_parameter_declaration",
    TypeConstraint => "type_constraint",
    FieldDeclarationList => "field_declaration_list",
    FieldDeclaration => "field_declaration",
    MethodElem => "method_elem",

    // Types
    PointerType => "pointer_type",
    ArrayType => "array_type",
    ImplicitLengthArrayType => "implicit_length_array_type",
    SliceType => "slice_type",
    StructType => "struct_type",
    InterfaceType => "interface_type",
    MapType => "map_type",
    ChannelType => "channel_type",
    FunctionType => "function_type",
    GenericType => "generic_type",
    TypeArguments => "type_arguments",
    QualifiedType => "qualified_type",
    ParenthesizedType => "parenthesized_type",
    NegatedType => "negated_type",
    TypeElem => "type_elem",

    // Expressions
    ExpressionList => "expression_list",
    ParenthesizedExpression => "parenthesized_expression",
    CallExpression => "call_expression",
    ArgumentList => "argument_list",
    VariadicArgument => "variadic_argument",
    SelectorExpression => "selector_expression",
    IndexExpression => "index_expression",
    SliceExpression => "slice_expression",
    TypeAssertionExpression => "type_assertion_expression",
    TypeConversionExpression => "type_conversion_expression",
    TypeInstantiationExpression => "type_instantiation_expression",
    CompositeLiteral => "composite_literal",
    LiteralValue => "literal_value",
    LiteralElement => "literal_element",
    KeyedElement => "keyed_element",
    FuncLiteral => "func_literal",
    UnaryExpression => "unary_expression",
    BinaryExpression => "binary_expression",

    // Statements
    Block => "block",
    StatementList => "statement_list",
    ExpressionStatement => "expression_statement",
    SendStatement => "send_statement",
    ReceiveStatement => "receive_statement",
    IncStatement => "inc_statement",
    DecStatement => "dec_statement",
    AssignmentStatement => "assignment_statement",
    ShortVarDeclaration => "short_var_declaration",
    LabeledStatement => "labeled_statement",
    EmptyStatement => "empty_statement",
    FallthroughStatement => "fallthrough_statement",
    BreakStatement => "break_statement",
    ContinueStatement => "continue_statement",
    GotoStatement => "goto_statement",
    ReturnStatement => "return_statement",
    GoStatement => "go_statement",
    DeferStatement => "defer_statement",
    IfStatement => "if_statement",
    ForStatement => "for_statement",
    ForClause => "for_clause",
    RangeClause => "range_clause",
    ExpressionSwitchStatement => "expression_switch_statement",
    TypeSwitchStatement => "type_switch_statement",
    ExpressionCase => "expression_case",
    TypeCase => "type_case",
    DefaultCase => "default_case",
    SelectStatement => "select_statement",
    CommunicationCase => "communication_case",
}

impl NodeKind {
    /// Classify a named node, or report the defect if its kind is unknown
    pub fn of(node: Node<'_>) -> Result<Self, TraversalDefect> {
        Self::from_name(node.kind()).ok_or_else(|| TraversalDefect {
            kind: node.kind(),
            offset: node.start_byte(),
        })
    }
}

/// Keywords highlighted with a fixed-length window at their construct's start
///
/// The windows are constants, not measured from the source. They stay correct
/// only as long as each construct starts with its keyword spelled exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Package,
    Import,
    Const,
    Type,
    Var,
    Struct,
    Interface,
}

impl Keyword {
    /// Window length in bytes
    pub const fn window(self) -> usize {
        match self {
            Keyword::Package => 7,
            Keyword::Import => 6,
            Keyword::Const => 5,
            Keyword::Type => 4,
            Keyword::Var => 3,
            Keyword::Struct => 6,
            Keyword::Interface => 9,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::Package => "package",
            Keyword::Import => "import",
            Keyword::Const => "const",
            Keyword::Type => "type",
            Keyword::Var => "var",
            Keyword::Struct => "struct",
            Keyword::Interface => "interface",
        }
    }
}

/// A named node kind missing from [`NodeKind`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalDefect {
    pub kind: &'static str,
    pub offset: usize,
}

impl fmt::Display for TraversalDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "walk: unexpected node kind `{}` at byte {}",
            self.kind, self.offset
        )
    }
}

impl std::error::Error for TraversalDefect {}
