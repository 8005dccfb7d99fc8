use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use portal_engine::{
    job_logs_path, ApiClient, ClientSettings, CompanyRecord, HttpBackend, LookupOutcome,
    MemoryTokenStore, PortalBackend,
};

fn backend_for(server: &MockServer) -> HttpBackend {
    let settings = ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    };
    let client = ApiClient::new(settings, Arc::new(MemoryTokenStore::with_token("tk"))).unwrap();
    HttpBackend::new(client)
}

#[tokio::test]
async fn job_list_keeps_response_order_and_optional_start() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "5f0c", "name": "Job sankhya_demo", "type": "sankhya_demo",
                 "status": "running", "progress": 40,
                 "created_at": "2024-01-15T09:59:00+00:00",
                 "started_at": "2024-01-15T10:00:00.123456+00:00", "finished_at": null},
                {"id": "9a1b", "name": "Job full_load_demo", "type": "full_load_demo",
                 "status": "queued", "progress": 0, "started_at": null}
            ],
            "page": 1,
            "pages": 1
        })))
        .mount(&server)
        .await;

    let jobs = backend_for(&server).list_jobs().await.expect("jobs");
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, "5f0c");
    assert_eq!(jobs[0].job_type, "sankhya_demo");
    assert_eq!(jobs[0].progress, 40.0);
    assert!(jobs[0].started_at.is_some());
    assert_eq!(jobs[1].id, "9a1b");
    assert_eq!(jobs[1].started_at, None);
}

#[tokio::test]
async fn job_logs_hit_the_per_job_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/5f0c/logs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"ts": "2024-01-15T10:00:05+00:00", "level": "INFO", "message": "Job finalizado"},
                {"ts": "2024-01-15T10:00:00+00:00", "level": "INFO", "message": "Criado e enfileirado"}
            ]
        })))
        .mount(&server)
        .await;

    assert_eq!(job_logs_path("5f0c").unwrap(), "/api/jobs/5f0c/logs/");
    let logs = backend_for(&server).job_logs("5f0c").await.expect("logs");
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].message, "Job finalizado");
    assert_eq!(logs[1].level, "INFO");
}

#[test]
fn job_ids_are_encoded_as_one_path_segment() {
    assert_eq!(job_logs_path("a b/c").unwrap(), "/api/jobs/a%20b%2Fc/logs/");
    assert_eq!(job_logs_path("5f0c?x#y").unwrap(), "/api/jobs/5f0c%3Fx%23y/logs/");
    assert!(job_logs_path("..").is_err());
    assert!(job_logs_path("").is_err());
}

#[tokio::test]
async fn job_logs_request_keeps_the_id_in_its_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/a%20b%2Fc/logs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let logs = backend_for(&server).job_logs("a b/c").await.expect("logs");
    assert!(logs.is_empty());
}

#[tokio::test]
async fn run_job_returns_the_acknowledgement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/run/"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "abc", "status": "queued"})),
        )
        .mount(&server)
        .await;

    let ack = backend_for(&server).run_job("sankhya_demo").await.expect("ack");
    assert_eq!(ack.id.as_deref(), Some("abc"));
    assert_eq!(ack.status.as_deref(), Some("queued"));
}

#[tokio::test]
async fn items_report_accepts_numbers_and_decimal_strings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/relatorios/itens-mais-vendidos/"))
        .and(query_param("de", "2024-01-01"))
        .and(query_param("ate", "2024-01-31"))
        .and(query_param("top", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "periodo": {"inicio": "2024-01-01T00:00:00-03:00", "fim": "2024-01-31T23:59:59-03:00"},
            "top": 5,
            "itens": [
                {"produto_id": 1, "produto__sku": "SKU-1", "produto__descricao": "Parafuso",
                 "qtd_total": 120, "valor_total": "1500.50"},
                {"produto_id": 2, "produto__sku": "SKU-2", "produto__descricao": "Porca",
                 "qtd_total": "30.000", "valor_total": 90}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = backend_for(&server)
        .items_report("/api/relatorios/itens-mais-vendidos/?de=2024-01-01&ate=2024-01-31&top=5")
        .await
        .expect("report");
    assert_eq!(report.items.len(), 2);
    assert_eq!(report.items[0].quantity, 120.0);
    assert_eq!(report.items[0].value, 1500.5);
    assert_eq!(report.items[1].quantity, 30.0);
    assert_eq!(report.items[1].description, "Porca");
}

#[tokio::test]
async fn empty_summary_decodes_to_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/relatorios/vendas-resumo/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totais": {"qtd_pedidos": 0, "total_vendido": "0", "ticket_medio": "0.00"},
            "por_cliente": []
        })))
        .mount(&server)
        .await;

    let summary = backend_for(&server)
        .sales_summary("/api/relatorios/vendas-resumo/?de=&ate=")
        .await
        .expect("summary");
    assert!(summary.customers.is_empty());
    assert_eq!(summary.totals.orders, 0.0);
    assert_eq!(summary.totals.average_ticket, 0.0);
}

#[tokio::test]
async fn lookup_success_returns_company_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cnpj/lookup/"))
        .and(query_param("cnpj", "12345678000195"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "data": {"cnpj": "12345678000195", "razao_social": "ACME LTDA", "nome_fantasia": "",
                     "municipio": "São Paulo", "uf": "SP", "cep": "01001000",
                     "logradouro": "Praça da Sé", "numero": "100", "complemento": "",
                     "bairro": "Sé", "email": "contato@acme.test"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = backend_for(&server)
        .lookup_company("12345678000195")
        .await
        .expect("lookup");
    let LookupOutcome::Found(company) = outcome else {
        panic!("expected data, got {outcome:?}");
    };
    assert_eq!(company.razao_social, "ACME LTDA");
    assert_eq!(company.uf, "SP");
    assert_eq!(company.nome_fantasia, "");
}

#[tokio::test]
async fn lookup_error_body_text_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cnpj/lookup/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"ok": false, "error": "CNPJ não encontrado"})),
        )
        .mount(&server)
        .await;

    let outcome = backend_for(&server)
        .lookup_company("12345678000195")
        .await
        .expect("lookup reached server");
    assert_eq!(
        outcome,
        LookupOutcome::Rejected {
            message: Some("CNPJ não encontrado".to_string())
        }
    );
}

#[tokio::test]
async fn lookup_detail_and_ok_false_are_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cnpj/lookup/"))
        .and(query_param("cnpj", "11111111111111"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Informe o parâmetro ?cnpj="})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cnpj/lookup/"))
        .and(query_param("cnpj", "22222222222222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cnpj/lookup/"))
        .and(query_param("cnpj", "33333333333333"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    assert_eq!(
        backend.lookup_company("11111111111111").await.unwrap(),
        LookupOutcome::Rejected {
            message: Some("Informe o parâmetro ?cnpj=".to_string())
        }
    );
    assert_eq!(
        backend.lookup_company("22222222222222").await.unwrap(),
        LookupOutcome::Rejected { message: None }
    );
    assert_eq!(
        backend.lookup_company("33333333333333").await.unwrap(),
        LookupOutcome::Rejected { message: None }
    );
}

#[tokio::test]
async fn lookup_ok_without_data_yields_empty_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cnpj/lookup/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let outcome = backend_for(&server).lookup_company("12345678000195").await.unwrap();
    assert_eq!(outcome, LookupOutcome::Found(CompanyRecord::default()));
}
