use log::warn;
use serde::Serialize;

use crate::error::ResolveError;
use crate::ingest::ResponseDescriptor;
use crate::language::TypeUsage;
use crate::schema::{TypeRef, TypeResolver};

/// One payload declared for a status code that carries several.
#[derive(Debug, Clone, Serialize)]
pub struct ExpectedSchemaModel {
    pub type_name: String,
    pub description: Option<String>,
}

/// Outcome of one status code.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseModel {
    pub status_code: String,
    /// `None` when the response has no body.
    pub type_name: Option<String>,
    #[serde(skip)]
    pub type_ref: Option<TypeRef>,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub is_success: bool,
    pub is_primary_success: bool,
    pub throws_exception: bool,
    pub is_file: bool,
    pub is_nullable: bool,
    /// Every declared payload, when the code carries more than one declaration.
    pub expected_schemas: Vec<ExpectedSchemaModel>,
    /// `expected_schemas` with repeated types dropped, for dispatching on
    /// the payload within the status code.
    pub payload_cases: Vec<ExpectedSchemaModel>,
    /// A throwing response whose payload can be one of several types.
    pub dispatches_on_payload: bool,
}

/// Numeric rank of a 2xx code. `2XX` ranks after every concrete code.
fn success_rank(code: &str) -> Option<u16> {
    if code.eq_ignore_ascii_case("2XX") {
        return Some(299);
    }
    match code.parse::<u16>() {
        Ok(n) if (200..300).contains(&n) => Some(n),
        _ => None,
    }
}

/// The lowest 2xx code, else `default`.
pub fn primary_success_code<'a>(codes: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut best: Option<(u16, &str)> = None;
    let mut has_default = None;
    for code in codes {
        if code == "default" {
            has_default = Some(code);
            continue;
        }
        if let Some(rank) = success_rank(code) {
            if best.is_none_or(|(current, _)| rank < current) {
                best = Some((rank, code));
            }
        }
    }
    best.map(|(_, code)| code).or(has_default)
}

/// Status codes a declared key covers, as a half-open range. `4XX`
/// covers 400 to 499. `None` for `default` and malformed keys.
pub fn status_range(code: &str) -> Option<(u16, u16)> {
    let bytes = code.as_bytes();
    if bytes.len() == 3 && bytes[1..].eq_ignore_ascii_case(b"XX") {
        let class = (bytes[0] as char).to_digit(10).filter(|c| (1..=5).contains(c))? as u16;
        return Some((class * 100, class * 100 + 100));
    }
    let exact = code.parse::<u16>().ok().filter(|n| (100..600).contains(n))?;
    Some((exact, exact + 1))
}

/// Any 2xx, plus `default` when it stands in as the primary success.
pub fn is_success_code(code: &str, primary: Option<&str>) -> bool {
    success_rank(code).is_some() || primary == Some(code)
}

impl ResponseModel {
    /// Build the model for all declarations of `status_code`.
    pub fn build<'doc>(
        status_code: &str,
        declarations: &[&ResponseDescriptor<'doc>],
        primary: Option<&str>,
        hint: &str,
        resolver: &mut TypeResolver<'doc, '_>,
    ) -> Result<Self, ResolveError> {
        let is_nullable = declarations.iter().any(|d| d.nullable);
        let payloads: Vec<&ResponseDescriptor<'doc>> = declarations
            .iter()
            .copied()
            .filter(|d| d.schema.is_some())
            .collect();

        let mut types = Vec::with_capacity(payloads.len());
        for payload in &payloads {
            if let Some(schema) = payload.schema {
                types.push(resolver.resolve_type(schema, is_nullable, Some(hint))?);
            }
        }

        let type_ref = match types.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            [first, rest @ ..] if rest.iter().all(|t| t == first) => Some(first.clone()),
            _ => Some(merge_payloads(status_code, &payloads, is_nullable, resolver)?),
        };

        let expected_schemas = if declarations.len() > 1 {
            payloads
                .iter()
                .zip(&types)
                .map(|(payload, ty)| ExpectedSchemaModel {
                    type_name: resolver.render(ty, TypeUsage::Response),
                    description: payload.description.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut payload_cases: Vec<ExpectedSchemaModel> = Vec::new();
        for expected in &expected_schemas {
            if !payload_cases.iter().any(|c| c.type_name == expected.type_name) {
                payload_cases.push(expected.clone());
            }
        }

        let is_success = is_success_code(status_code, primary);
        let first = declarations.first();
        Ok(Self {
            status_code: status_code.to_string(),
            type_name: type_ref
                .as_ref()
                .map(|ty| resolver.render(ty, TypeUsage::Response)),
            description: first.and_then(|d| d.response_description.clone()),
            content_type: first.and_then(|d| d.content_type.clone()),
            is_success,
            is_primary_success: primary == Some(status_code),
            throws_exception: !is_success && type_ref.is_some(),
            dispatches_on_payload: !is_success && payload_cases.len() > 1,
            is_file: type_ref.as_ref().is_some_and(TypeRef::is_file),
            is_nullable: type_ref.as_ref().is_some_and(TypeRef::is_nullable),
            expected_schemas,
            payload_cases,
            type_ref,
        })
    }
}

/// Narrowest common base of differing payloads, else the top type.
fn merge_payloads<'doc>(
    status_code: &str,
    payloads: &[&ResponseDescriptor<'doc>],
    is_nullable: bool,
    resolver: &mut TypeResolver<'doc, '_>,
) -> Result<TypeRef, ResolveError> {
    let mut names = Vec::with_capacity(payloads.len());
    for payload in payloads {
        let Some(schema) = payload.schema else {
            continue;
        };
        match resolver.registry().resolve(schema)?.name {
            Some(name) => names.push(name),
            None => {
                warn!(
                    "status {status_code} declares an inline payload among several, using the top type"
                );
                return Ok(TypeRef::Any);
            }
        }
    }
    match resolver.registry().common_ancestor(&names) {
        Some(base) => {
            let ty = resolver.resolve_component(base)?;
            Ok(if is_nullable { ty.nullable() } else { ty })
        }
        None => {
            warn!(
                "status {status_code} declares unrelated payloads {}, using the top type",
                names.join(", ")
            );
            Ok(TypeRef::Any)
        }
    }
}
