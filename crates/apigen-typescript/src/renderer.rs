use apigen_core::config::{TypeNamingOptions, TypeScriptTemplate};
use apigen_core::error::RenderError;
use apigen_core::model::response::status_range;
use apigen_core::model::{ClientModel, DtoModel};
use apigen_core::{ArtifactRenderer, UtilityModel};
use minijinja::{Environment, Value, context};

use crate::language::{UNIVERSAL_EXCEPTION, string_literal};

#[derive(Debug, Clone, Copy)]
enum Template {
    Client,
    Interface,
    Dto,
    Utility,
    File,
}

impl Template {
    const ALL: [Template; 5] = [
        Template::Client,
        Template::Interface,
        Template::Dto,
        Template::Utility,
        Template::File,
    ];

    fn name(self) -> &'static str {
        match self {
            Template::Client => "client.ts.j2",
            Template::Interface => "interface.ts.j2",
            Template::Dto => "dto.ts.j2",
            Template::Utility => "utility.ts.j2",
            Template::File => "file.ts.j2",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Template::Client => include_str!("../templates/client.ts.j2"),
            Template::Interface => include_str!("../templates/interface.ts.j2"),
            Template::Dto => include_str!("../templates/dto.ts.j2"),
            Template::Utility => include_str!("../templates/utility.ts.j2"),
            Template::File => include_str!("../templates/file.ts.j2"),
        }
    }
}

/// Renders TypeScript artifacts for the fetch or axios transport.
pub struct TypeScriptRenderer {
    env: Environment<'static>,
    naming: TypeNamingOptions,
    transport: TypeScriptTemplate,
}

impl TypeScriptRenderer {
    pub fn new(
        naming: &TypeNamingOptions,
        transport: TypeScriptTemplate,
    ) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("js_doc", js_doc);
        env.add_filter("ts_string", ts_string);
        env.add_filter("status_test", status_test);
        for template in Template::ALL {
            env.add_template(template.name(), template.source())?;
        }
        Ok(Self {
            env,
            naming: naming.clone(),
            transport,
        })
    }

    fn is_axios(&self) -> bool {
        self.transport == TypeScriptTemplate::Axios
    }

    fn render(&self, template: Template, ctx: Value) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(template.name())?;
        let mut source = tmpl.render(ctx)?;
        source.truncate(source.trim_end().len());
        Ok(source)
    }

    /// Join rendered artifacts into one module.
    pub fn render_file(
        &self,
        title: &str,
        version: &str,
        sources: &[&str],
    ) -> Result<String, RenderError> {
        let mut file = self.render(
            Template::File,
            context! {
                title => title,
                version => version,
                axios => self.is_axios(),
                sources => sources,
            },
        )?;
        file.push('\n');
        Ok(file)
    }
}

impl ArtifactRenderer for TypeScriptRenderer {
    fn render_client_interface(&self, client: &ClientModel) -> Result<String, RenderError> {
        self.render(Template::Interface, context! { client => client })
    }

    fn render_client(&self, client: &ClientModel) -> Result<String, RenderError> {
        self.render(
            Template::Client,
            context! {
                client => client,
                axios => self.is_axios(),
                envelope => &self.naming.response_envelope_type,
                file_response => &self.naming.file_response_type,
                universal_exception => UNIVERSAL_EXCEPTION,
            },
        )
    }

    fn render_dto(&self, dto: &DtoModel) -> Result<String, RenderError> {
        self.render(Template::Dto, context! { dto => dto })
    }

    fn render_utility(&self, utility: &UtilityModel) -> Result<String, RenderError> {
        self.render(Template::Utility, context! { utility => utility })
    }
}

/// Make text safe inside a one-line `/** */` comment.
fn js_doc(value: String) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace("*/", "*\\/")
}

fn ts_string(value: String) -> String {
    string_literal(&value)
}

fn status_test(code: String) -> String {
    match status_range(&code) {
        Some((low, high)) if high == low + 1 => format!("status === {low}"),
        Some((low, high)) => format!("status >= {low} && status < {high}"),
        None => "false".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_text_cannot_close_the_comment() {
        assert_eq!(js_doc("ends */ early\nsecond".into()), "ends *\\/ early second");
    }

    #[test]
    fn status_tests_cover_ranges() {
        assert_eq!(status_test("201".into()), "status === 201");
        assert_eq!(status_test("5XX".into()), "status >= 500 && status < 600");
    }

    #[test]
    fn exception_utility_comes_with_its_throw_helper() {
        let naming = TypeNamingOptions::default();
        let renderer = TypeScriptRenderer::new(&naming, TypeScriptTemplate::Fetch).unwrap();
        let source = renderer
            .render_utility(&UtilityModel::Exception {
                name: "ApiException".into(),
            })
            .unwrap();
        assert!(source.starts_with("export class ApiException extends Error {"));
        assert!(source.ends_with(
            "function throwApiException(message: string, status: number, response: string, headers: { [key: string]: any; }, result?: any): never {\n    throw new ApiException(message, status, response, headers, result ?? null);\n}"
        ));
    }
}
