use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::models::{ProductFilter, ProductRecord, ThermocupDraft, ThermocupUpdate};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Клиент Warehouse API. Не хранит состояния между вызовами, поэтому
/// один экземпляр безопасно делится между всеми сессиями.
///
/// Любой сбой (таймаут, обрыв соединения, статус >= 400, битое тело)
/// сворачивается в `None`: вызывающий код не различает причины и
/// одинаково сообщает пользователю о неудаче. Повторов нет.
#[derive(Clone)]
pub struct WarehouseClient {
    base_url: String,
    http: Client,
}

impl WarehouseClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Универсальный запрос к API. 204 нормализуется в маркер успеха.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&'static str, String)]>,
        body: Option<Value>,
    ) -> Option<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let mut request = self.http.request(method.clone(), url.as_str());
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("API request error: {} {}: {}", method, url, e);
                return None;
            }
        };

        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Some(serde_json::json!({ "success": true }));
        }

        if status.is_client_error() || status.is_server_error() {
            let text = response.text().await.unwrap_or_default();
            log::error!("API error {} for {} {}: {}", status, method, url, text);
            return None;
        }

        match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("API response parse error for {} {}: {}", method, url, e);
                None
            }
        }
    }

    fn parse_record(&self, value: Value) -> Option<ProductRecord> {
        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::error!("API record parse error: {}", e);
                None
            }
        }
    }

    /// Список товаров с фильтрами.
    pub async fn get_products(&self, filter: &ProductFilter) -> Option<Vec<ProductRecord>> {
        let pairs = filter.to_query_pairs();
        log::info!("GET /products with params: {:?}", pairs);

        let value = self
            .request(Method::GET, "products", Some(&pairs), None)
            .await?;

        match serde_json::from_value(value) {
            Ok(products) => Some(products),
            Err(e) => {
                log::error!("API product list parse error: {}", e);
                None
            }
        }
    }

    /// Товар по ID, сырым объектом: детальная карточка показывает все
    /// поля, какие бы сервис ни вернул.
    pub async fn get_product_by_id(&self, product_id: i64) -> Option<Value> {
        self.request(Method::GET, &format!("products/{product_id}"), None, None)
            .await
    }

    pub async fn get_thermocup_by_id(&self, product_id: i64) -> Option<Value> {
        self.request(
            Method::GET,
            &format!("products/thermocups/{product_id}"),
            None,
            None,
        )
        .await
    }

    pub async fn create_thermocup(&self, draft: &ThermocupDraft) -> Option<ProductRecord> {
        let body = match serde_json::to_value(draft) {
            Ok(body) => body,
            Err(e) => {
                log::error!("Draft serialization error: {}", e);
                return None;
            }
        };

        let value = self
            .request(Method::POST, "products/thermocups/create", None, Some(body))
            .await?;
        self.parse_record(value)
    }

    pub async fn update_thermocup(
        &self,
        product_id: i64,
        update: &ThermocupUpdate,
    ) -> Option<ProductRecord> {
        let body = match serde_json::to_value(update) {
            Ok(body) => body,
            Err(e) => {
                log::error!("Update serialization error: {}", e);
                return None;
            }
        };

        let value = self
            .request(
                Method::PUT,
                &format!("products/thermocups/update/{product_id}"),
                None,
                Some(body),
            )
            .await?;
        self.parse_record(value)
    }

    pub async fn update_reserved(
        &self,
        product_id: i64,
        quantity_change: i64,
    ) -> Option<ProductRecord> {
        let body = serde_json::json!({ "quantity_change": quantity_change });

        let value = self
            .request(
                Method::PATCH,
                &format!("products/thermocups/update/{product_id}/reserved"),
                None,
                Some(body),
            )
            .await?;
        self.parse_record(value)
    }

    pub async fn update_stock(
        &self,
        product_id: i64,
        warehouse_id: i64,
        quantity_change: i64,
    ) -> Option<ProductRecord> {
        let body = serde_json::json!({
            "warehouse_id": warehouse_id,
            "quantity_change": quantity_change,
        });

        let value = self
            .request(
                Method::PATCH,
                &format!("products/thermocups/update/{product_id}/stock"),
                None,
                Some(body),
            )
            .await?;
        self.parse_record(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Принимает одно соединение и отвечает заготовленными байтами.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        });

        format!("http://{}", addr)
    }

    fn http_json(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn parses_product_list() {
        let body = r#"[{"id": 1, "name": "Stanley Classic", "base_price": 45.99}]"#;
        let base_url = serve_once(http_json("200 OK", body)).await;

        let client = WarehouseClient::new(&base_url).unwrap();
        let products = client
            .get_products(&ProductFilter::with_limit(10))
            .await
            .unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, Some(1));
        assert_eq!(products[0].name.as_deref(), Some("Stanley Classic"));
    }

    #[tokio::test]
    async fn not_found_is_absent() {
        let base_url = serve_once(http_json("404 Not Found", r#"{"detail":"no"}"#)).await;

        let client = WarehouseClient::new(&base_url).unwrap();
        assert!(client.get_product_by_id(42).await.is_none());
    }

    #[tokio::test]
    async fn server_error_is_absent() {
        let base_url = serve_once(http_json("500 Internal Server Error", "boom")).await;

        let client = WarehouseClient::new(&base_url).unwrap();
        assert!(client.get_product_by_id(42).await.is_none());
    }

    #[tokio::test]
    async fn connection_failure_is_absent() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = WarehouseClient::new(&format!("http://{}", addr)).unwrap();
        assert!(client.get_product_by_id(42).await.is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_absent() {
        let base_url = serve_once(http_json("200 OK", "{not json")).await;

        let client = WarehouseClient::new(&base_url).unwrap();
        assert!(client.get_product_by_id(42).await.is_none());
    }

    #[tokio::test]
    async fn no_content_is_success_not_absent() {
        let response = "HTTP/1.1 204 No Content\r\nconnection: close\r\n\r\n".to_string();
        let base_url = serve_once(response).await;

        let client = WarehouseClient::new(&base_url).unwrap();
        let record = client.update_reserved(1, 5).await;

        assert!(record.is_some());
    }
}
