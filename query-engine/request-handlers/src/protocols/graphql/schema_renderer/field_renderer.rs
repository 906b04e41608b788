use super::*;

#[derive(Debug)]
pub(super) struct GqlFieldRenderer<'a> {
    field: &'a OutputField,
}

impl<'a> Renderer for GqlFieldRenderer<'a> {
    fn render(&self, ctx: &mut RenderContext) -> String {
        self.render_output_field(ctx)
    }
}

impl<'a> GqlFieldRenderer<'a> {
    pub(super) fn new(field: &'a OutputField) -> Self {
        Self { field }
    }

    fn render_output_field(&self, ctx: &mut RenderContext) -> String {
        let rendered_args: Vec<String> = self.field.arguments().iter().map(render_argument).collect();

        let rendered_args = if rendered_args.is_empty() {
            "".into()
        } else if rendered_args.len() > 1 {
            // Multiline - double indent.
            format!(
                "({}\n{})",
                rendered_args
                    .into_iter()
                    .map(|arg| format!("\n{}{}", ctx.indent().repeat(2), arg))
                    .collect::<Vec<String>>()
                    .join(""),
                ctx.indent()
            )
        } else {
            // Single line
            format!("({})", rendered_args.join(", "))
        };

        format!("{}{}: {}", self.field.name(), rendered_args, self.field.field_type())
    }
}

fn render_argument(arg: &Argument) -> String {
    format!("{}: {}", arg.name, arg.argument_type)
}
