//! Check what the HTTP client sends and how it reads answers, against a one-shot local server

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use seminar_board::client::{Client, IntegrationFields};
use seminar_board::reply::{settle, Reply, ToggleReply};
use seminar_board::templates::TemplateFields;
use seminar_board::traits::{TaskService, TemplateService};
use seminar_board::{BoardError, TaskId};

/// Serve a single request with a canned answer. The handle resolves to the raw request
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_is_complete(&raw) {
                break;
            }
        }
        let response = format!("HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                               status, body.len(), body);
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&raw).to_string()
    });
    (url, handle)
}

fn request_is_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let header_end = match text.find("\r\n\r\n") {
        None => return false,
        Some(i) => i,
    };
    let content_length = text[..header_end].lines()
        .filter_map(|line| {
            let mut parts = line.splitn(2, ':');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if key.eq_ignore_ascii_case("content-length") => value.trim().parse::<usize>().ok(),
                _ => None,
            }
        })
        .next()
        .unwrap_or(0);
    raw.len() >= header_end + 4 + content_length
}


#[tokio::test]
async fn test_toggle_request() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (url, server) = serve_once("200 OK", r#"{"success": true, "is_done": true, "is_overdue": false}"#).await;
    let client = Client::new(&url, Some("s3cr3t".to_string())).unwrap();

    let reply = client.toggle_task(TaskId::from(17), true).await.unwrap();
    assert_eq!(reply, Reply::Success(ToggleReply { is_overdue: false, is_done: Some(true) }));

    let request = server.await.unwrap();
    let lowercase = request.to_lowercase();
    assert!(request.starts_with("POST /seminars/tasks/17/toggle-ajax/ HTTP/1.1"));
    assert!(lowercase.contains("x-csrftoken: s3cr3t"));
    assert!(lowercase.contains("content-type: application/x-www-form-urlencoded"));
    assert!(lowercase.contains("user-agent: seminarboard/"));
    assert!(request.ends_with("task_id=17&is_completed=true"));
}

#[tokio::test]
async fn test_rejections_with_error_status() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (url, server) = serve_once("400 Bad Request", r#"{"success": false, "errors": {"deadline": "Please enter a valid date (YYYY-MM-DD)"}}"#).await;
    let client = Client::new(&url, None).unwrap();

    let result = settle(client.update_task(TaskId::from(3), "Badges", "2026-02-30").await);
    match result {
        Err(err @ BoardError::Rejected { .. }) => assert_eq!(err.user_message(), "Please enter a valid date (YYYY-MM-DD)"),
        other => panic!("unexpected result {:?}", other),
    }

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /seminars/tasks/3/update-ajax/ "));
    assert!(request.to_lowercase().contains("x-csrftoken") == false);
    assert!(request.ends_with("name=Badges&deadline=2026-02-30"));
}

#[tokio::test]
async fn test_unreadable_answers_are_transport_errors() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (url, server) = serve_once("502 Bad Gateway", "<html>Bad Gateway</html>").await;
    let client = Client::new(&url, None).unwrap();

    let result = settle(client.create_task(9, "Print badges", "2026-10-22").await);
    assert!(matches!(result, Err(BoardError::Transport(_))));
    assert!(server.await.unwrap().starts_with("POST /seminars/9/tasks/create-ajax/ "));
}

#[tokio::test]
async fn test_template_requests() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (url, server) = serve_once("200 OK", r#"{"success": true, "id": 5, "name": "Book the room", "relative_days_before": -30,
        "default_assignee": "", "default_notes": "", "when_display": "-30 days (-4 weeks -2 days)"}"#).await;
    let client = Client::new(&url, Some("t".to_string())).unwrap();

    let reply = client.create_template_task(2, &TemplateFields::new("Book the room", "-30")).await.unwrap();
    assert_eq!(reply.into_result().unwrap().relative_days_before, Some(-30));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /seminars/templates/2/tasks/create-ajax/ "));
    assert!(request.ends_with("name=Book+the+room&relative_days_before=-30&default_assignee=&default_notes="));
}

#[tokio::test]
async fn test_site_requests() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (url, server) = serve_once("200 OK", r#"{"success": true, "is_favorite": true}"#).await;
    let client = Client::new(&url, Some("tok".to_string())).unwrap();
    assert!(client.toggle_favorite(81).await.unwrap().into_result().unwrap().is_favorite);
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /news/toggle_favorite/81/ "));
    assert!(request.ends_with("csrfmiddlewaretoken=tok"));

    let (url, server) = serve_once("200 OK", r#"{"success": true, "days_before": 3}"#).await;
    let client = Client::new(&url, None).unwrap();
    let reply = client.update_notification(6, Some(3), &[1, 4]).await.unwrap();
    assert_eq!(reply.into_result().unwrap().days_before, Some(3));
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /seminars/notifications/6/update/ "));
    assert!(request.ends_with("days_before=3&integration_ids=1%2C4"));

    let (url, server) = serve_once("404 Not Found", r#"{"success": false, "error": "Not found"}"#).await;
    let client = Client::new(&url, None).unwrap();
    let fields = IntegrationFields { provider: "slack".to_string(), name: "Team".to_string(), is_active: true, config: None };
    let reply = client.update_integration(12, &fields).await.unwrap();
    assert_eq!(reply, Reply::failure("Not found"));
    assert!(server.await.unwrap().starts_with("POST /account/integrations/12/update/ "));
}
