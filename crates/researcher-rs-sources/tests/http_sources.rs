//! Adapters exercised against a throwaway local HTTP listener.

use pretty_assertions::assert_eq;
use researcher_rs_config::{MarketSourceConfig, NewsSourceConfig, StockSourceConfig};
use researcher_rs_sources::{
    AmazonProductSource, NewsApiSource, NewsSource, ProductSource, SourceError, StockSource,
    YahooQuoteSource,
};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one canned response and hand back the raw request head.
async fn serve_once(status: &'static str, body: &'static str) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = socket.read(&mut buf).await.expect("read");
            if read == 0 {
                break;
            }
            head.extend_from_slice(&buf[..read]);
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write");
        String::from_utf8_lossy(&head).to_string()
    });
    (addr, handle)
}

#[tokio::test]
async fn news_search_sends_expected_parameters() {
    let (addr, request) = serve_once(
        "200 OK",
        r#"{"status":"ok","articles":[{"source":{"name":"Wire"},"title":"AI update","description":"d","url":"https://x","publishedAt":"2024-06-02T00:00:00Z"}]}"#,
    )
    .await;
    let config = NewsSourceConfig {
        endpoint: format!("http://{addr}/v2/everything"),
        ..NewsSourceConfig::default()
    };
    let source = NewsApiSource::new(&config, Some("secret".to_string())).expect("source");

    let articles = source.search("ai chips", 3).await.expect("articles");
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "AI update");

    let head = request.await.expect("request");
    let request_line = head.lines().next().unwrap_or_default().to_string();
    assert!(request_line.starts_with("GET /v2/everything?"), "{request_line}");
    assert!(request_line.contains("q=ai+chips"), "{request_line}");
    assert!(request_line.contains("sortBy=publishedAt"), "{request_line}");
    assert!(request_line.contains("pageSize=3"), "{request_line}");
    assert!(request_line.contains("apiKey=secret"), "{request_line}");
}

#[tokio::test]
async fn product_search_sends_rapidapi_headers() {
    let (addr, request) = serve_once(
        "200 OK",
        r#"{"status":"OK","data":{"products":[{"product_title":"Phone","product_price":"$10","product_star_rating":"4.1","product_num_ratings":12,"product_url":"https://p"}]}}"#,
    )
    .await;
    let config = MarketSourceConfig {
        endpoint: format!("http://{addr}/search"),
        host: "products.test".to_string(),
        ..MarketSourceConfig::default()
    };
    let source = AmazonProductSource::new(&config, Some("rapid".to_string())).expect("source");

    let products = source.search("phone").await.expect("products");
    assert_eq!(products.len(), 1);

    let head = request.await.expect("request").to_ascii_lowercase();
    assert!(head.contains("x-rapidapi-key: rapid"), "{head}");
    assert!(head.contains("x-rapidapi-host: products.test"), "{head}");
    assert!(head.contains("sort_by=relevance"), "{head}");
}

#[tokio::test]
async fn stock_not_found_payload_wins_over_status() {
    let (addr, _request) = serve_once(
        "404 Not Found",
        r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#,
    )
    .await;
    let config = StockSourceConfig {
        endpoint: format!("http://{addr}/v8/finance/chart"),
        ..StockSourceConfig::default()
    };
    let source = YahooQuoteSource::new(&config).expect("source");
    let err = source.quote("NOPE").await.unwrap_err();
    assert!(matches!(err, SourceError::NotFound(ref symbol) if symbol == "NOPE"), "{err}");
}

const CHART_BODY: &str = r#"{"chart":{"result":[{"meta":{"symbol":"AAPL","currency":"USD","regularMarketPrice":190.0,"chartPreviousClose":185.0}}],"error":null}}"#;

#[tokio::test]
async fn stock_quote_includes_market_cap_from_summary() {
    let (chart_addr, chart_request) = serve_once("200 OK", CHART_BODY).await;
    let (summary_addr, summary_request) = serve_once(
        "200 OK",
        r#"{"quoteSummary":{"result":[{"price":{"marketCap":{"raw":2950000000000,"fmt":"2.95T"}}}],"error":null}}"#,
    )
    .await;
    let config = StockSourceConfig {
        endpoint: format!("http://{chart_addr}/v8/finance/chart"),
        summary_endpoint: format!("http://{summary_addr}/v10/finance/quoteSummary/"),
        ..StockSourceConfig::default()
    };
    let source = YahooQuoteSource::new(&config).expect("source");

    let quote = source.quote("AAPL").await.expect("quote");
    assert_eq!(quote.price, 190.0);
    assert_eq!(quote.market_cap, Some(2.95e12));

    let chart_head = chart_request.await.expect("chart request");
    assert!(chart_head.starts_with("GET /v8/finance/chart/AAPL?"), "{chart_head}");
    let summary_head = summary_request.await.expect("summary request");
    assert!(
        summary_head.starts_with("GET /v10/finance/quoteSummary/AAPL?modules=price"),
        "{summary_head}"
    );
}

#[tokio::test]
async fn failed_market_cap_lookup_keeps_the_quote() {
    let (chart_addr, _chart_request) = serve_once("200 OK", CHART_BODY).await;
    let (summary_addr, _summary_request) =
        serve_once("401 Unauthorized", r#"{"finance":{"error":"Invalid Crumb"}}"#).await;
    let config = StockSourceConfig {
        endpoint: format!("http://{chart_addr}/v8/finance/chart"),
        summary_endpoint: format!("http://{summary_addr}/v10/finance/quoteSummary"),
        ..StockSourceConfig::default()
    };
    let source = YahooQuoteSource::new(&config).expect("source");

    let quote = source.quote("AAPL").await.expect("quote");
    assert_eq!(quote.previous_close, Some(185.0));
    assert_eq!(quote.market_cap, None);
}

#[tokio::test]
async fn non_json_error_status_is_reported() {
    let (addr, _request) = serve_once("401 Unauthorized", "denied").await;
    let config = NewsSourceConfig {
        endpoint: format!("http://{addr}/v2/everything"),
        ..NewsSourceConfig::default()
    };
    let source = NewsApiSource::new(&config, Some("bad".to_string())).expect("source");
    let err = source.search("ai", 7).await.unwrap_err();
    assert!(
        matches!(err, SourceError::Status { status: 401, ref body } if body == "denied"),
        "{err}"
    );
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let _server = tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.expect("accept");
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    });
    let config = StockSourceConfig {
        endpoint: format!("http://{addr}/chart"),
        timeout_secs: 1,
        ..StockSourceConfig::default()
    };
    let source = YahooQuoteSource::new(&config).expect("source");
    let err = source.quote("AAPL").await.unwrap_err();
    assert!(err.is_timeout(), "{err}");
}
