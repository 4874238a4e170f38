use apigen_core::config::{ApigenConfig, TypeScriptTemplate};
use apigen_core::{ClientGenerator, CodeGenerator, parse};
use apigen_typescript::{TypeScriptGenerator, TypeScriptLanguage, TypeScriptRenderer};

const PETSTORE: &str = include_str!("../../apigen-core/tests/fixtures/petstore.yaml");
const HIERARCHY: &str = include_str!("../../apigen-core/tests/fixtures/hierarchy.yaml");
const UPLOAD: &str = include_str!("../../apigen-core/tests/fixtures/upload.yaml");
const MERGED_ERRORS: &str = include_str!("../../apigen-core/tests/fixtures/merged-errors.yaml");

fn module(yaml: &str, config: &ApigenConfig) -> String {
    let doc = parse::from_yaml(yaml).unwrap();
    let files = TypeScriptGenerator.generate(&doc, config).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, config.typescript.file_name);
    files.into_iter().next().unwrap().content
}

#[test]
fn one_module_with_header() {
    let content = module(PETSTORE, &ApigenConfig::default());
    assert!(content.starts_with("//----------------------\n// <auto-generated>"));
    assert!(content.contains("Generated by apigen from Petstore 1.0.0"));
    assert!(!content.contains("from \"axios\""));
    assert!(content.contains("/** Everything about pets */\nexport class PetsClient {\n"));
    assert!(content.contains("export class StoreClient {\n"));
}

#[test]
fn method_signatures() {
    let content = module(PETSTORE, &ApigenConfig::default());
    assert!(content.contains(
        "    listPets(kind: Kind, tag?: string[] | null, limit: number | null = 20): Promise<Pet[]> {"
    ));
    assert!(content.contains("    createPet(body: NewPet): Promise<Pet> {"));
    assert!(content.contains("    getPet(petId: number): Promise<Pet> {"));
    assert!(content.contains("    deletePet(petId: number): Promise<void> {"));
    assert!(content.contains("    getInventory(): Promise<{ [key: string]: number; }> {"));
}

#[test]
fn fetch_requests() {
    let content = module(PETSTORE, &ApigenConfig::default());
    assert!(content.contains(
        r#"let url_ = this.baseUrl + "/pets/" + encodeURIComponent(this.formatValue(petId));"#
    ));
    assert!(content.contains(r#"url_ += "limit=" + encodeURIComponent(this.formatValue(limit)) + "&";"#));
    assert!(content.contains(r#"tag.forEach(item_ => { url_ += "tag=" + encodeURIComponent(this.formatValue(item_)) + "&"; });"#));
    assert!(content.contains(r#"headers_["Content-Type"] = "application/json";"#));
    assert!(content.contains("const content_ = JSON.stringify(body);"));
    assert!(content.contains(
        "return this.http.fetch(url_, options_).then((response: Response) => this.processListPets(response));"
    ));
    assert!(content.contains(r#"this.baseUrl = baseUrl ?? "https://petstore.example.com/v1";"#));
}

#[test]
fn response_processing() {
    let content = module(PETSTORE, &ApigenConfig::default());
    assert!(content.contains("    protected processListPets(response: Response): Promise<Pet[]> {"));
    assert!(content.contains("        if (status === 200) {"));
    assert!(content.contains(
        r#"return throwApiException("Unexpected error", status, responseText_, headers_, result_);"#
    ));
    assert!(content.contains(r#"return throwApiException("Not found", status, responseText_, headers_);"#));
    assert!(content.contains("function throwApiException("));

    let store = content
        .split("export class StoreClient")
        .nth(1)
        .and_then(|rest| rest.split("export interface NewPet").next())
        .unwrap();
    assert!(!store.contains("ApiException"));
    assert!(store.contains(r#"throw new Error("An unexpected server error occurred (" + status + "): " + responseText_);"#));
}

#[test]
fn merged_failures_type_the_payload_as_a_union() {
    let content = module(MERGED_ERRORS, &ApigenConfig::default());
    assert!(content.contains(
        r#"const result_: NotFoundError | GoneError = responseText_ === "" ? null as any : JSON.parse(responseText_);"#
    ));
    assert!(content.contains(
        r#"return throwApiException("Missing", status, responseText_, headers_, result_);"#
    ));
    assert!(content.contains("const result_: NotFoundError | Document = "));
}

#[test]
fn throws_tags_name_the_error_payload() {
    let content = module(PETSTORE, &ApigenConfig::default());
    assert!(content.contains(
        "     * @throws {ApiException} A server side error occurred (payload type Error).\n     */\n    createPet(body: NewPet): Promise<Pet> {"
    ));
    assert!(content.contains(
        "     * @throws {ApiException} A server side error occurred.\n     */\n    getPet(petId: number): Promise<Pet> {"
    ));
    assert!(!content.contains("@throws {ApiException} A server side error occurred.\n     */\n    getInventory("));
}

#[test]
fn schema_types_are_interfaces_and_enums() {
    let content = module(PETSTORE, &ApigenConfig::default());
    assert!(content.contains("export interface Pet extends NewPet {\n    id: number;\n    born?: string;\n}"));
    assert!(content.contains("    name: string;\n    tag?: string;\n    status?: NewPetStatus;\n"));
    assert!(content.contains("export enum Kind {\n    Dog = \"dog\",\n    Cat = \"cat\",\n}"));
}

#[test]
fn enum_rendering() {
    let doc = parse::from_yaml(PETSTORE).unwrap();
    let config = ApigenConfig::default();
    let language = TypeScriptLanguage::from_options(&config.typescript);
    let renderer = TypeScriptRenderer::new(&config.settings.type_naming, config.typescript.template).unwrap();
    let artifacts = ClientGenerator::new(&config.settings, &language, &renderer)
        .generate(&doc)
        .unwrap();
    let status = artifacts
        .iter()
        .find(|a| a.type_name == "NewPetStatus")
        .unwrap();

    insta::assert_snapshot!(status.source, @r#"
    export enum NewPetStatus {
        Available = "available",
        Pending = "pending",
        Sold = "sold",
    }
    "#);
}

#[test]
fn axios_transport() {
    let mut config = ApigenConfig::default();
    config.typescript.template = TypeScriptTemplate::Axios;
    let content = module(PETSTORE, &config);
    assert!(content.contains("import axios from \"axios\";\n"));
    assert!(content.contains("this.instance = instance ? instance : axios.create();"));
    assert!(content.contains(
        "return this.instance.request(options_).then((response: AxiosResponse) => this.processGetPet(response));"
    ));
    assert!(content.contains("    protected processGetPet(response: AxiosResponse): Promise<Pet> {"));
    assert!(content.contains(r#"responseType: "text","#));
    assert!(content.contains("            data: content_,\n"));
    assert!(!content.contains("this.http.fetch"));
}

#[test]
fn leaf_types_widen_polymorphic_parameters() {
    let mut config = ApigenConfig::default();
    config.typescript.use_leaf_types = true;
    let content = module(HIERARCHY, &config);
    assert!(content.contains("    addAnimal(body: Puppy | Cat): Promise<Animal> {"));
    assert!(content.contains("export interface Animal {\n    kind: string;\n    name?: string;\n}"));
    assert!(content.contains("export interface Dog extends Animal {\n    barks?: boolean;\n}"));

    let content = module(HIERARCHY, &ApigenConfig::default());
    assert!(content.contains("    addAnimal(body: Animal): Promise<Animal> {"));
}

#[test]
fn loose_null_checks_drop_null_unions() {
    let mut config = ApigenConfig::default();
    config.typescript.strict_null_checks = false;
    let content = module(PETSTORE, &config);
    assert!(content.contains("listPets(kind: Kind, tag?: string[], limit: number = 20): Promise<Pet[]>"));
}

#[test]
fn files_use_form_data_and_blobs() {
    let content = module(UPLOAD, &ApigenConfig::default());
    assert!(content.contains("export class Client {\n"));
    assert!(content.contains("    uploadFile(body: FileParameter): Promise<void> {"));
    assert!(content.contains("const content_ = new FormData();"));
    assert!(content.contains(r#"content_.append("body", body.data, body.fileName ? body.fileName : "body");"#));
    assert!(content.contains("    downloadFile(name: string): Promise<FileResponse> {"));
    assert!(content.contains("return response.blob().then(blob_ => {"));
    assert!(content.contains("export interface FileParameter {\n    data: any;\n    fileName: string;\n}"));
}

#[test]
fn interfaces_and_envelopes() {
    let mut config = ApigenConfig::default();
    config.settings.client.generate_client_interfaces = true;
    config.settings.common.wrap_responses = true;
    let content = module(PETSTORE, &config);
    assert!(content.contains("export interface IPetsClient {\n"));
    assert!(content.contains("export class PetsClient implements IPetsClient {\n"));
    assert!(content.contains("    getPet(petId: number): Promise<SwaggerResponse<Pet>>;\n"));
    assert!(content.contains("return new SwaggerResponse<Pet>(status, headers_, result_);"));
    assert!(content.contains("return new SwaggerResponse<void>(status, headers_, null as any);"));
    assert!(content.contains("export class SwaggerResponse<TResult> {"));
}
