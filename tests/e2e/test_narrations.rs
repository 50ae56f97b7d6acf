use crate::e2e::helpers;

use helpers::api_client::MultipartForm;
use helpers::fixtures::pdf_with_pages;
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use test_context::test_context;

fn upload(filename: &str, pages: &[&str], email: &str) -> MultipartForm {
    MultipartForm::new()
        .file("file", filename, &pdf_with_pages(pages))
        .text("email", email)
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_upload_and_deliver_narration(ctx: &TestContext) {
    let form = upload(
        "book.pdf",
        &[
            "Table of Contents",
            "Chapter 1 The river ran cold",
            "The end came quietly",
        ],
        "reader@example.com",
    );

    let response = ctx.client.post_multipart("/api/narrations", form).await.unwrap();

    response.assert_status(StatusCode::ACCEPTED);
    assert_eq!(response.json_str("status").as_deref(), Some("queued"));
    assert_eq!(response.json_str("filename").as_deref(), Some("book.pdf"));
    assert_eq!(
        response.json_str("message").as_deref(),
        Some("Upload complete. Processing started.")
    );
    let job_id = response.json_str("job_id").unwrap();

    let status = ctx.wait_for_job(&job_id).await;
    assert_eq!(status.json_str("status").as_deref(), Some("completed"));
    assert!(status.body.as_ref().unwrap().get("error").is_none());

    let deliveries = ctx.notifier.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].job_id.to_string(), job_id);
    assert_eq!(deliveries[0].recipient, "reader@example.com");
    assert_eq!(deliveries[0].document_name, "book.pdf");
    assert_eq!(deliveries[0].audio_file, "book.mp3");
    assert_eq!(deliveries[0].audio_url, format!("/api/narrations/{}/audio", job_id));

    let audio = ctx
        .client
        .get(&format!("/api/narrations/{}/audio", job_id))
        .await
        .unwrap();
    audio
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg")
        .assert_header("content-disposition", "attachment; filename=\"book.mp3\"");

    let narration = audio.text();
    assert!(!narration.contains("Contents"), "front matter was narrated: {}", narration);
    let first = narration.find("The river ran cold").unwrap();
    let second = narration.find("The end came quietly").unwrap();
    assert!(first < second);

    let audio_bytes = status
        .body
        .as_ref()
        .and_then(|body| body.get("audio_bytes"))
        .and_then(|value| value.as_u64());
    assert_eq!(audio_bytes, Some(audio.body_bytes.len() as u64));
    assert_eq!(deliveries[0].audio_bytes, audio.body_bytes.len() as u64);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_mark_job_failed_and_keep_no_audio_when_synthesis_fails(ctx: &TestContext) {
    let form = upload(
        "broken.pdf",
        &["Chapter 1 All good here", "Then FAIL happens"],
        "reader@example.com",
    );

    let response = ctx.client.post_multipart("/api/narrations", form).await.unwrap();
    response.assert_status(StatusCode::ACCEPTED);
    let job_id = response.json_str("job_id").unwrap();

    let status = ctx.wait_for_job(&job_id).await;
    assert_eq!(status.json_str("status").as_deref(), Some("failed"));
    let error = status.json_str("error").unwrap();
    assert!(error.contains("synthesis failed for unit 1"), "unexpected error: {}", error);

    assert!(ctx.notifier.deliveries().is_empty());
    assert!(!ctx.storage_dir.join(format!("{}.mp3", job_id)).exists());
    assert!(!ctx.storage_dir.join(format!("{}.mp3.part", job_id)).exists());

    ctx.client
        .get(&format!("/api/narrations/{}/audio", job_id))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_non_pdf_upload(ctx: &TestContext) {
    let form = MultipartForm::new()
        .file("file", "notes.txt", b"just some notes")
        .text("email", "reader@example.com");

    let response = ctx.client.post_multipart("/api/narrations", form).await.unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Only PDF files allowed");
    assert!(ctx.tts.calls().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_email(ctx: &TestContext) {
    let form = MultipartForm::new().file("file", "book.pdf", &pdf_with_pages(&["Chapter 1"]));

    let response = ctx.client.post_multipart("/api/narrations", form).await.unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Email is required");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_file(ctx: &TestContext) {
    let form = MultipartForm::new().text("email", "reader@example.com");

    let response = ctx.client.post_multipart("/api/narrations", form).await.unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("No file provided");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_job(ctx: &TestContext) {
    let job_id = uuid::Uuid::new_v4();

    ctx.client
        .get(&format!("/api/narrations/{}", job_id))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Narration job not found");

    ctx.client
        .get(&format!("/api/narrations/{}/audio", job_id))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stream_audio_in_document_order(ctx: &TestContext) {
    // The first unit is slow, so the second finishes synthesis first
    let form = MultipartForm::new().file(
        "file",
        "short.pdf",
        &pdf_with_pages(&["Chapter 1 slow opening words", "quick closing words"]),
    );

    let response = ctx
        .client
        .post_multipart("/api/narrations/stream", form)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg");

    let narration = response.text();
    let first = narration.find("slow opening words").unwrap();
    let second = narration.find("quick closing words").unwrap();
    assert!(first < second, "audio out of order: {}", narration);
    assert_eq!(ctx.tts.calls().len(), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_stream_failure_before_any_audio(ctx: &TestContext) {
    let form = MultipartForm::new().file(
        "file",
        "short.pdf",
        &pdf_with_pages(&["FAIL right away", "this part is fine"]),
    );

    let response = ctx
        .client
        .post_multipart("/api/narrations/stream", form)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("synthesis failed for unit 0");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_break_stream_when_a_later_unit_fails(ctx: &TestContext) {
    let form = MultipartForm::new().file(
        "file",
        "short.pdf",
        &pdf_with_pages(&["Chapter 1 fine start", "slow FAIL later"]),
    );

    let result = ctx.client.post_multipart("/api/narrations/stream", form).await;

    assert!(result.is_err(), "a failed narration must not look complete");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stream_empty_audio_for_unreadable_pdf(ctx: &TestContext) {
    let form = MultipartForm::new().file("file", "empty.pdf", b"%PDF-1.5 truncated");

    let response = ctx
        .client
        .post_multipart("/api/narrations/stream", form)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert!(response.body_bytes.is_empty());
    assert!(ctx.tts.calls().is_empty());
}
