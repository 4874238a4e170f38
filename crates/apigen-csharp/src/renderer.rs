use apigen_core::ArtifactRenderer;
use apigen_core::UtilityModel;
use apigen_core::config::TypeNamingOptions;
use apigen_core::error::RenderError;
use apigen_core::model::response::status_range;
use apigen_core::model::{ClientModel, DtoModel};
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
            Template::Client => "client.cs.j2",
            Template::Interface => "interface.cs.j2",
            Template::Dto => "dto.cs.j2",
            Template::Utility => "utility.cs.j2",
            Template::File => "file.cs.j2",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Template::Client => include_str!("../templates/client.cs.j2"),
            Template::Interface => include_str!("../templates/interface.cs.j2"),
            Template::Dto => include_str!("../templates/dto.cs.j2"),
            Template::Utility => include_str!("../templates/utility.cs.j2"),
            Template::File => include_str!("../templates/file.cs.j2"),
        }
    }
}

/// Text of the `<auto-generated>` file header.
#[derive(Debug, Clone, Default)]
pub struct FileHeader<'a> {
    pub title: &'a str,
    pub version: &'a str,
    pub namespace: &'a str,
    pub nullable_reference_types: bool,
}

/// Renders C# artifacts from minijinja templates.
pub struct CSharpRenderer {
    env: Environment<'static>,
    naming: TypeNamingOptions,
}

impl CSharpRenderer {
    pub fn new(naming: &TypeNamingOptions) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("xml_doc", xml_doc);
        env.add_filter("cs_string", cs_string);
        env.add_filter("status_test", status_test);
        for template in Template::ALL {
            env.add_template(template.name(), template.source())?;
        }
        Ok(Self {
            env,
            naming: naming.clone(),
        })
    }

    fn render(&self, template: Template, ctx: Value) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(template.name())?;
        let mut source = tmpl.render(ctx)?;
        source.truncate(source.trim_end().len());
        Ok(source)
    }

    /// Wrap rendered artifacts in one compilation unit.
    pub fn render_file(
        &self,
        header: &FileHeader<'_>,
        sources: &[&str],
    ) -> Result<String, RenderError> {
        let mut file = self.render(
            Template::File,
            context! {
                title => header.title,
                version => header.version,
                namespace => header.namespace,
                nullable_reference_types => header.nullable_reference_types,
                sources => sources,
            },
        )?;
        file.push('\n');
        Ok(file)
    }
}

impl ArtifactRenderer for CSharpRenderer {
    fn render_client_interface(&self, client: &ClientModel) -> Result<String, RenderError> {
        self.render(Template::Interface, context! { client => client })
    }

    fn render_client(&self, client: &ClientModel) -> Result<String, RenderError> {
        self.render(
            Template::Client,
            context! {
                client => client,
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

/// Make text safe inside a one-line `///` comment.
fn xml_doc(value: String) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn cs_string(value: String) -> String {
    string_literal(&value)
}

/// Condition on `status_` matching a declared status key.
fn status_test(code: String) -> String {
    match status_range(&code) {
        Some((low, high)) if high == low + 1 => format!("status_ == {low}"),
        Some((low, high)) => format!("status_ >= {low} && status_ < {high}"),
        None => "false".to_string(),
    }
}
