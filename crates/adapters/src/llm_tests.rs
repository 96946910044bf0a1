use super::*;
use fake::FakeLlmClient;

#[tokio::test]
async fn fake_chat_stream_emits_tokens_then_resolves_to_full_content() {
    let client = FakeLlmClient::new("hello world", 0.002);
    let (tx, mut rx) = mpsc::channel(16);
    let messages = vec![ChatMessage { role: Role::User, content: "hi".to_string() }];

    let completion = client.chat_stream("gpt", &messages, tx).await.unwrap();
    assert_eq!(completion.content, "hello world");
    assert_eq!(completion.cost, 0.002);

    let mut received = String::new();
    while let Ok(token) = rx.try_recv() {
        received.push_str(&token);
    }
    assert_eq!(received, "hello world");
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn fake_chat_returns_configured_response() {
    let client = FakeLlmClient::new("initial", 0.001);
    client.set_response("updated answer");
    let messages = vec![ChatMessage { role: Role::System, content: "sys".to_string() }];
    let completion = client.chat("gpt", &messages).await.unwrap();
    assert_eq!(completion.content, "updated answer");
}
