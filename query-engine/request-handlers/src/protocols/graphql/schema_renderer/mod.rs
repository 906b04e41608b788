mod field_renderer;
mod object_renderer;

use field_renderer::*;
use join_core::schema::*;
use object_renderer::*;
use std::collections::HashMap;

/// Top level GraphQL schema renderer.
struct GqlSchemaRenderer<'a> {
    query_schema: &'a QuerySchema,
}

impl<'a> Renderer for GqlSchemaRenderer<'a> {
    fn render(&self, ctx: &mut RenderContext) -> String {
        for object_type in self.query_schema.object_types() {
            object_type.as_renderer().render(ctx);
        }

        format!("schema {{\n{}query: {}\n}}", ctx.indent(), self.query_schema.query().name())
    }
}

impl<'a> GqlSchemaRenderer<'a> {
    fn new(query_schema: &'a QuerySchema) -> GqlSchemaRenderer<'a> {
        GqlSchemaRenderer { query_schema }
    }
}

/// Renders the schema as GraphQL SDL: the schema definition followed by the
/// object types, the query type first.
pub fn render_graphql_schema(query_schema: &QuerySchema) -> String {
    let mut context = RenderContext::new();
    let schema_definition = query_schema.as_renderer().render(&mut context);

    format!("{}\n\n{}", schema_definition, context.format())
}

trait Renderer {
    fn render(&self, ctx: &mut RenderContext) -> String;
}

struct RenderContext {
    /// Output queue for all (top level) elements that need to be rendered,
    output_queue: Vec<String>,

    /// Prevents double rendering of elements that are referenced multiple times.
    rendered: HashMap<String, ()>,

    /// General indent level in spaces.
    indent: usize,

    /// Indent string.
    indent_str: &'static str,
}

impl RenderContext {
    fn new() -> Self {
        RenderContext {
            output_queue: Default::default(),
            rendered: Default::default(),
            indent: 2,
            indent_str: " ",
        }
    }

    fn format(self) -> String {
        self.output_queue.join("\n\n")
    }

    fn already_rendered(&self, cache_key: &str) -> bool {
        self.rendered.contains_key(cache_key)
    }

    fn mark_as_rendered(&mut self, cache_key: String) {
        self.rendered.insert(cache_key, ());
    }

    fn add(&mut self, cache_key: String, output: String) {
        self.output_queue.push(output);
        self.mark_as_rendered(cache_key);
    }

    fn indent(&self) -> String {
        self.indent_str.repeat(self.indent)
    }
}

enum GqlRenderer<'a> {
    Schema(GqlSchemaRenderer<'a>),
    Object(GqlObjectRenderer<'a>),
    Field(GqlFieldRenderer<'a>),
}

impl<'a> Renderer for GqlRenderer<'a> {
    fn render(&self, ctx: &mut RenderContext) -> String {
        match self {
            GqlRenderer::Schema(s) => s.render(ctx),
            GqlRenderer::Object(o) => o.render(ctx),
            GqlRenderer::Field(f) => f.render(ctx),
        }
    }
}

trait AsRenderer<'a> {
    fn as_renderer(&self) -> GqlRenderer<'a>;
}

impl<'a> AsRenderer<'a> for &'a QuerySchema {
    fn as_renderer(&self) -> GqlRenderer<'a> {
        GqlRenderer::Schema(GqlSchemaRenderer::new(self))
    }
}

impl<'a> AsRenderer<'a> for &'a ObjectType {
    fn as_renderer(&self) -> GqlRenderer<'a> {
        GqlRenderer::Object(GqlObjectRenderer::new(self))
    }
}

impl<'a> AsRenderer<'a> for &'a OutputField {
    fn as_renderer(&self) -> GqlRenderer<'a> {
        GqlRenderer::Field(GqlFieldRenderer::new(self))
    }
}
