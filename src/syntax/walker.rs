//! Span production by recursive traversal of a Go syntax tree
//!
//! [`walk`] visits every named node in source order and calls `emit` once per
//! highlightable token. Only named children are visited; anonymous grammar
//! tokens (punctuation and most keywords) carry no category of their own.
//!
//! Coloring rules:
//! - identifiers and placeholder (`ERROR`) nodes: [`ColorRole::Identifier`]
//! - literals: [`ColorRole::Literal`]
//! - names of fields, parameters, methods, type parameters and declared
//!   types, plus bare struct-literal keys: [`ColorRole::Field`]
//! - `package`, `import`, `const`, `type`, `var`, `struct`, `interface`: a
//!   fixed [`Keyword::window`] at the construct's start, [`ColorRole::Keyword`]
//!
//! Emission order is non-decreasing in start position: every construct emits
//! its own span (if any) before descending, and children are visited in order.

use std::ops::ControlFlow;

use tree_sitter::Node;

use super::kind::{Keyword, NodeKind};
use super::span::{Position, Span};
use crate::palette::ColorRole;

/// Walk `node` and everything below it, emitting spans in source order.
///
/// # Panics
///
/// Panics with a [`TraversalDefect`](super::TraversalDefect) message when a
/// named node has a kind outside [`NodeKind`]. That is an internal
/// consistency fault, not an input error.
pub fn walk<F: FnMut(Span)>(node: Node<'_>, emit: &mut F) {
    let _ = try_walk(node, &mut |span| {
        emit(span);
        ControlFlow::Continue(())
    });
}

/// Like [`walk`], but stops as soon as `emit` breaks.
///
/// Returns `Break` if the walk was cut short.
pub fn try_walk<F>(node: Node<'_>, emit: &mut F) -> ControlFlow<()>
where
    F: FnMut(Span) -> ControlFlow<()>,
{
    let kind = match NodeKind::of(node) {
        Ok(kind) => kind,
        Err(defect) => panic!("{}", defect),
    };

    match kind {
        // Expressions that are just a name
        NodeKind::Identifier
        | NodeKind::FieldIdentifier
        | NodeKind::TypeIdentifier
        | NodeKind::PackageIdentifier
        | NodeKind::LabelName
        | NodeKind::BlankIdentifier
        | NodeKind::Dot
        | NodeKind::Nil
        | NodeKind::True
        | NodeKind::False
        | NodeKind::Iota
        | NodeKind::Error => emit(covering(node, ColorRole::Identifier)),

        NodeKind::IntLiteral
        | NodeKind::FloatLiteral
        | NodeKind::ImaginaryLiteral
        | NodeKind::RuneLiteral
        | NodeKind::InterpretedStringLiteral
        | NodeKind::RawStringLiteral
        | NodeKind::InterpretedStringLiteralContent
        | NodeKind::RawStringLiteralContent
        | NodeKind::EscapeSequence => emit(covering(node, ColorRole::Literal)),

        NodeKind::Comment => ControlFlow::Continue(()),

        // Keyword-introduced constructs
        NodeKind::PackageClause => walk_keyword(node, Keyword::Package, emit),
        NodeKind::ImportDeclaration => walk_keyword(node, Keyword::Import, emit),
        NodeKind::ConstDeclaration => walk_keyword(node, Keyword::Const, emit),
        NodeKind::TypeDeclaration => walk_keyword(node, Keyword::Type, emit),
        NodeKind::VarDeclaration => walk_keyword(node, Keyword::Var, emit),
        NodeKind::StructType => walk_keyword(node, Keyword::Struct, emit),
        NodeKind::InterfaceType => walk_keyword(node, Keyword::Interface, emit),

        // Field-like nodes: names first, then the declared type
        NodeKind::FieldDeclaration
        | NodeKind::ParameterDeclaration
        | NodeKind::VariadicParameterDeclaration
        | NodeKind::MethodElem
        | NodeKind::TypeParameterDeclaration
        | NodeKind::TypeSpec
        | NodeKind::TypeAlias => walk_field(node, emit),

        NodeKind::KeyedElement => walk_keyed_element(node, emit),

        // Files and declarations
        NodeKind::SourceFile
        | NodeKind::ImportSpec
        | NodeKind::ImportSpecList
        | NodeKind::ConstSpec
        | NodeKind::VarSpec
        | NodeKind::VarSpecList
        | NodeKind::FunctionDeclaration
        | NodeKind::MethodDeclaration
        // Field and parameter lists
        | NodeKind::ParameterList
        | NodeKind::TypeParameterList
        | NodeKind::TypeConstraint
        | NodeKind::FieldDeclarationList
        // Types
        | NodeKind::PointerType
        | NodeKind::ArrayType
        | NodeKind::ImplicitLengthArrayType
        | NodeKind::SliceType
        | NodeKind::MapType
        | NodeKind::ChannelType
        | NodeKind::FunctionType
        | NodeKind::GenericType
        | NodeKind::TypeArguments
        | NodeKind::QualifiedType
        | NodeKind::ParenthesizedType
        | NodeKind::NegatedType
        | NodeKind::TypeElem
        // Expressions
        | NodeKind::ExpressionList
        | NodeKind::ParenthesizedExpression
        | NodeKind::CallExpression
        | NodeKind::ArgumentList
        | NodeKind::VariadicArgument
        | NodeKind::SelectorExpression
        | NodeKind::IndexExpression
        | NodeKind::SliceExpression
        | NodeKind::TypeAssertionExpression
        | NodeKind::TypeConversionExpression
        | NodeKind::TypeInstantiationExpression
        | NodeKind::CompositeLiteral
        | NodeKind::LiteralValue
        | NodeKind::LiteralElement
        | NodeKind::FuncLiteral
        | NodeKind::UnaryExpression
        | NodeKind::BinaryExpression
        // Statements
        | NodeKind::Block
        | NodeKind::StatementList
        | NodeKind::ExpressionStatement
        | NodeKind::SendStatement
        | NodeKind::ReceiveStatement
        | NodeKind::IncStatement
        | NodeKind::DecStatement
        | NodeKind::AssignmentStatement
        | NodeKind::ShortVarDeclaration
        | NodeKind::LabeledStatement
        | NodeKind::EmptyStatement
        | NodeKind::FallthroughStatement
        | NodeKind::BreakStatement
        | NodeKind::ContinueStatement
        | NodeKind::GotoStatement
        | NodeKind::ReturnStatement
        | NodeKind::GoStatement
        | NodeKind::DeferStatement
        | NodeKind::IfStatement
        | NodeKind::ForStatement
        | NodeKind::ForClause
        | NodeKind::RangeClause
        | NodeKind::ExpressionSwitchStatement
        | NodeKind::TypeSwitchStatement
        | NodeKind::ExpressionCase
        | NodeKind::TypeCase
        | NodeKind::DefaultCase
        | NodeKind::SelectStatement
        | NodeKind::CommunicationCase => walk_children(node, emit),
    }
}

/// Walk a tree and collect its spans
pub fn collect_spans(node: Node<'_>) -> Vec<Span> {
    let mut spans = Vec::new();
    walk(node, &mut |span| spans.push(span));
    spans
}

fn walk_children<F>(node: Node<'_>, emit: &mut F) -> ControlFlow<()>
where
    F: FnMut(Span) -> ControlFlow<()>,
{
    for (_, child) in named_children(node) {
        try_walk(child, emit)?;
    }
    ControlFlow::Continue(())
}

fn walk_keyword<F>(node: Node<'_>, keyword: Keyword, emit: &mut F) -> ControlFlow<()>
where
    F: FnMut(Span) -> ControlFlow<()>,
{
    let start = node.start_byte();
    emit(Span::new(
        Position(start),
        Position(start + keyword.window()),
        ColorRole::Keyword,
    ))?;
    walk_children(node, emit)
}

fn walk_field<F>(node: Node<'_>, emit: &mut F) -> ControlFlow<()>
where
    F: FnMut(Span) -> ControlFlow<()>,
{
    for (field, child) in named_children(node) {
        if field == Some("name") {
            emit(covering(child, ColorRole::Field))?;
        } else {
            try_walk(child, emit)?;
        }
    }
    ControlFlow::Continue(())
}

/// The key of `Point{X: 1}` is colored like a field name when it is a bare
/// identifier; any other key is an ordinary expression.
fn walk_keyed_element<F>(node: Node<'_>, emit: &mut F) -> ControlFlow<()>
where
    F: FnMut(Span) -> ControlFlow<()>,
{
    let mut key_seen = false;
    for (_, child) in named_children(node) {
        if !key_seen && NodeKind::from_name(child.kind()) != Some(NodeKind::Comment) {
            key_seen = true;
            if let Some(name) = bare_key(child) {
                emit(covering(name, ColorRole::Field))?;
                continue;
            }
        }
        try_walk(child, emit)?;
    }
    ControlFlow::Continue(())
}

fn bare_key(node: Node<'_>) -> Option<Node<'_>> {
    match NodeKind::from_name(node.kind())? {
        NodeKind::Identifier | NodeKind::FieldIdentifier => Some(node),
        NodeKind::LiteralElement => match named_children(node).as_slice() {
            [(_, only)]
                if matches!(
                    NodeKind::from_name(only.kind()),
                    Some(NodeKind::Identifier | NodeKind::FieldIdentifier)
                ) =>
            {
                Some(*only)
            }
            _ => None,
        },
        _ => None,
    }
}

fn covering(node: Node<'_>, color: ColorRole) -> Span {
    Span::new(
        Position(node.start_byte()),
        Position(node.end_byte()),
        color,
    )
}

/// Named children in source order, with the grammar field each one fills
fn named_children<'t>(node: Node<'t>) -> Vec<(Option<&'static str>, Node<'t>)> {
    let mut children = Vec::with_capacity(node.named_child_count());
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.is_named() {
                children.push((cursor.field_name(), child));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    children
}
