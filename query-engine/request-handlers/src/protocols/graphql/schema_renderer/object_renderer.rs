use super::*;

#[derive(Debug)]
pub(super) struct GqlObjectRenderer<'a> {
    object_type: &'a ObjectType,
}

impl<'a> Renderer for GqlObjectRenderer<'a> {
    fn render(&self, ctx: &mut RenderContext) -> String {
        self.render_output_object(ctx)
    }
}

impl<'a> GqlObjectRenderer<'a> {
    pub(super) fn new(object_type: &'a ObjectType) -> Self {
        Self { object_type }
    }

    fn render_output_object(&self, ctx: &mut RenderContext) -> String {
        let object_type = self.object_type;

        if ctx.already_rendered(object_type.name()) {
            return "".into();
        } else {
            // This short circuits recursive processing for fields.
            ctx.mark_as_rendered(object_type.name().to_owned())
        }

        let fields = object_type.get_fields();
        let mut rendered_fields = Vec::with_capacity(fields.len());

        for field in fields {
            rendered_fields.push(field.as_renderer().render(ctx))
        }

        let indented: Vec<String> = rendered_fields
            .into_iter()
            .map(|f| format!("{}{}", ctx.indent(), f))
            .collect();

        let rendered = format!("type {} {{\n{}\n}}", object_type.name(), indented.join("\n"));

        ctx.add(object_type.name().to_owned(), rendered.clone());

        rendered
    }
}
