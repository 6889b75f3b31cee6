use async_trait::async_trait;
use genie_application::{ChatEvent, ChatPipeline, ClientState, InsightOutcome, InsightService, SpaceService};
use genie_core::agent::{AgentResponse, CompletionService, GenieAgent};
use genie_core::session::{BotContent, ChatTrigger, MessageWidget, UserInput};
use genie_core::space::Space;
use genie_core::table::{QueryPayload, ResultTable};
use genie_core::{GenieError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

/// Agent that replays scripted answers and records what it was asked.
#[derive(Default)]
struct MockAgent {
    answers: StdMutex<VecDeque<Result<AgentResponse>>>,
    calls: StdMutex<Vec<(String, String, Option<String>)>>,
    spaces: Option<Vec<Space>>,
}

impl MockAgent {
    fn answering(answers: Vec<Result<AgentResponse>>) -> Self {
        Self {
            answers: StdMutex::new(answers.into()),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(String, String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenieAgent for MockAgent {
    async fn query(
        &self,
        message: &str,
        _access_token: Option<&str>,
        space_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<AgentResponse> {
        self.calls.lock().unwrap().push((
            message.to_string(),
            space_id.to_string(),
            conversation_id.map(str::to_string),
        ));
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenieError::internal("no scripted answer")))
    }

    async fn list_spaces(&self, _access_token: Option<&str>) -> Result<Vec<Space>> {
        self.spaces
            .clone()
            .ok_or_else(|| GenieError::transport("connection refused"))
    }
}

struct MockCompletion {
    reply: Result<String>,
    prompts: StdMutex<Vec<String>>,
}

impl MockCompletion {
    fn new(reply: Result<String>) -> Self {
        Self {
            reply,
            prompts: StdMutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionService for MockCompletion {
    async fn complete(&self, prompt: &str, _access_token: Option<&str>) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}

fn table_answer(conversation_id: &str, table: ResultTable) -> Result<AgentResponse> {
    Ok(AgentResponse {
        conversation_id: conversation_id.into(),
        payload: QueryPayload::Table(table),
        sql: None,
    })
}

fn active_client() -> Mutex<ClientState> {
    let mut state = ClientState::new();
    state.selection.list(vec![Space::bare("space-1")]);
    state.confirm_space(Some("space-1")).unwrap();
    Mutex::new(state)
}

fn text(s: &str) -> UserInput {
    UserInput::Text(s.to_string())
}

fn sales_table() -> ResultTable {
    ResultTable::new(
        vec!["region".into(), "total".into()],
        vec![
            vec![Some("EMEA".into()), Some("10".into())],
            vec![Some("APAC".into()), Some("7".into())],
        ],
    )
}

#[tokio::test]
async fn test_single_cell_answer_renders_as_prose_value() {
    let agent = Arc::new(MockAgent::answering(vec![table_answer(
        "conv-1",
        ResultTable::new(vec!["n".into()], vec![vec![Some("42".into())]]),
    )]));
    let pipeline = ChatPipeline::new(agent.clone());
    let client = active_client();

    {
        let mut state = client.lock().await;
        let event = ChatPipeline::submit(&mut state, &text("How many rows?"));
        assert!(matches!(event, ChatEvent::Submitted { .. }));
        assert!(state.query_running);
        assert!(state.transcript()[1].is_thinking());
    }

    let widget = pipeline.fetch_and_render(&client, Some("tok")).await;
    assert!(widget.is_some());

    let state = client.lock().await;
    let transcript = state.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0], MessageWidget::user("How many rows?"));
    assert_eq!(
        transcript[1],
        MessageWidget::bot(BotContent::Value {
            text: "42".into(),
            sql: None
        })
    );
    assert!(!state.query_running);
    assert_eq!(state.trigger, ChatTrigger::reset());
    assert_eq!(state.conversation_id.as_deref(), Some("conv-1"));
    assert_eq!(
        agent.calls(),
        vec![("How many rows?".to_string(), "space-1".to_string(), None)]
    );
}

#[tokio::test]
async fn test_transport_error_becomes_error_bubble() {
    let agent = Arc::new(MockAgent::answering(vec![Err(GenieError::transport(
        "connection reset",
    ))]));
    let pipeline = ChatPipeline::new(agent);
    let client = active_client();

    ChatPipeline::submit(&mut *client.lock().await, &text("Top customers?"));
    pipeline.fetch_and_render(&client, None).await;

    let state = client.lock().await;
    let last = state.transcript().last().cloned();
    match last {
        Some(MessageWidget::Bot {
            content: BotContent::Error { message },
        }) => assert!(message.starts_with("Sorry, I encountered an error:")),
        other => panic!("expected error bubble, got {other:?}"),
    }
    assert!(!state.query_running);
    assert_eq!(state.trigger, ChatTrigger::reset());
    assert_eq!(state.sessions.len(), 1);
    assert_eq!(state.sessions[0].queries, vec!["Top customers?"]);
}

#[tokio::test]
async fn test_blank_input_changes_nothing() {
    let client = active_client();
    let mut state = client.lock().await;

    for input in [text(""), text("   "), UserInput::Suggestion(9)] {
        assert!(ChatPipeline::submit(&mut state, &input).is_ignored());
    }
    assert!(state.sessions.is_empty());
    assert!(state.transcript().is_empty());
    assert_eq!(state.trigger, ChatTrigger::reset());
    assert!(!state.query_running);
}

#[tokio::test]
async fn test_second_submit_while_running_is_ignored() {
    let client = active_client();
    let mut state = client.lock().await;

    ChatPipeline::submit(&mut state, &text("first"));
    assert!(ChatPipeline::submit(&mut state, &text("second")).is_ignored());
    assert_eq!(state.transcript().len(), 2);
}

#[tokio::test]
async fn test_submit_without_agent_is_ignored() {
    let mut state = ClientState::new();
    assert!(ChatPipeline::submit(&mut state, &text("hello")).is_ignored());
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_fetch_without_trigger_does_nothing() {
    let pipeline = ChatPipeline::new(Arc::new(MockAgent::default()));
    let client = active_client();
    assert!(pipeline.fetch(&client, None).await.is_none());
}

#[tokio::test]
async fn test_follow_up_reuses_conversation_and_session() {
    let agent = Arc::new(MockAgent::answering(vec![
        Ok(AgentResponse {
            conversation_id: "conv-7".into(),
            payload: QueryPayload::Text("Hi".into()),
            sql: None,
        }),
        table_answer("conv-7", sales_table()),
    ]));
    let pipeline = ChatPipeline::new(agent.clone());
    let client = active_client();

    ChatPipeline::submit(&mut *client.lock().await, &text("hello"));
    pipeline.fetch_and_render(&client, None).await;
    ChatPipeline::submit(&mut *client.lock().await, &UserInput::Suggestion(0));
    pipeline.fetch_and_render(&client, None).await;

    let calls = agent.calls();
    assert_eq!(calls[1].0, "What is the purpose of this Agent? Give me a short summary.");
    assert_eq!(calls[1].2.as_deref(), Some("conv-7"));

    let state = client.lock().await;
    assert_eq!(state.sessions.len(), 1);
    assert_eq!(state.transcript().len(), 4);
    assert!(matches!(
        state.transcript()[3],
        MessageWidget::Bot {
            content: BotContent::Table { .. }
        }
    ));
}

#[tokio::test]
async fn test_new_chat_waits_for_reply_in_flight() {
    let agent = Arc::new(MockAgent::answering(vec![table_answer("conv-1", sales_table())]));
    let pipeline = ChatPipeline::new(agent);
    let client = active_client();

    let origin = {
        let mut state = client.lock().await;
        ChatPipeline::submit(&mut state, &text("sales by region"));
        state.current_session.clone().unwrap()
    };

    let event = pipeline.fetch(&client, None).await.unwrap();
    {
        let mut state = client.lock().await;
        assert!(!state.new_chat());
        assert!(ChatPipeline::submit(&mut state, &text("second")).is_ignored());

        assert!(ChatPipeline::render(&mut state, event).is_some());
        let origin_session = state.session(&origin).unwrap();
        assert_eq!(origin_session.messages.len(), 2);
        assert!(!origin_session.has_pending_reply());
        assert_eq!(origin_session.conversation_id.as_deref(), Some("conv-1"));
        assert!(!state.query_running);

        assert!(state.new_chat());
        assert!(state.transcript().is_empty());
        assert_eq!(state.conversation_id, None);
    }
}

#[tokio::test]
async fn test_change_agent_before_fetch_cancels_turn() {
    let agent = Arc::new(MockAgent::default());
    let pipeline = ChatPipeline::new(agent.clone());
    let client = active_client();

    let origin = {
        let mut state = client.lock().await;
        ChatPipeline::submit(&mut state, &text("sales by region"));
        let origin = state.current_session.clone().unwrap();
        state.change_space();
        origin
    };

    assert!(pipeline.fetch_and_render(&client, None).await.is_none());
    assert!(agent.calls().is_empty());

    let state = client.lock().await;
    let session = state.session(&origin).unwrap();
    assert_eq!(
        session.messages,
        vec![MessageWidget::user("sales by region"), MessageWidget::cancelled()]
    );
    assert!(!state.query_running);
    assert_eq!(state.trigger, ChatTrigger::reset());
}

#[tokio::test]
async fn test_change_agent_during_fetch_keeps_one_query_in_flight() {
    let agent = Arc::new(MockAgent::answering(vec![
        table_answer("conv-1", sales_table()),
        table_answer("conv-2", sales_table()),
    ]));
    let pipeline = ChatPipeline::new(agent.clone());
    let client = active_client();

    let origin = {
        let mut state = client.lock().await;
        ChatPipeline::submit(&mut state, &text("sales by region"));
        state.current_session.clone().unwrap()
    };
    let event = pipeline.fetch(&client, None).await.unwrap();

    {
        let mut state = client.lock().await;
        state.change_space();
        state.selection.list(vec![Space::bare("space-1")]);
        state.confirm_space(Some("space-1")).unwrap();

        assert!(state.query_running);
        assert!(ChatPipeline::submit(&mut state, &text("second")).is_ignored());

        // The late reply is dropped; the cancellation notice stays the only answer.
        assert!(ChatPipeline::render(&mut state, event).is_none());
        let session = state.session(&origin).unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[1], MessageWidget::cancelled());
        assert!(!state.query_running);

        assert!(matches!(
            ChatPipeline::submit(&mut state, &text("second")),
            ChatEvent::Submitted { .. }
        ));
    }
    pipeline.fetch_and_render(&client, None).await;
    assert_eq!(agent.calls().len(), 2);
}

#[tokio::test]
async fn test_insight_for_older_session_table() {
    let agent = Arc::new(MockAgent::answering(vec![table_answer("conv-1", sales_table())]));
    let pipeline = ChatPipeline::new(agent);
    let client = active_client();

    ChatPipeline::submit(&mut *client.lock().await, &text("sales by region"));
    let table_id = match pipeline.fetch_and_render(&client, None).await {
        Some(MessageWidget::Bot {
            content: BotContent::Table { table_id, .. },
        }) => table_id,
        other => panic!("expected table, got {other:?}"),
    };

    // A newer session goes on top of the list.
    {
        let mut state = client.lock().await;
        state.new_chat();
        state.ensure_current_session().push_user_turn("unrelated");
    }

    let completion = Arc::new(MockCompletion::new(Ok("EMEA leads.".into())));
    let insights = InsightService::new(completion.clone());
    let outcome = insights.generate(&client, &table_id, Some("tok")).await;

    assert_eq!(outcome, InsightOutcome::Generated("EMEA leads.".into()));
    let prompts = completion.prompts.lock().unwrap().clone();
    assert!(prompts[0].ends_with("Table data:\nregion,total\nEMEA,10\nAPAC,7\n"));

    let state = client.lock().await;
    let (session, _) = state.find_table(&table_id).unwrap();
    assert_eq!(session.insight(&table_id), Some("EMEA leads."));
}

#[tokio::test]
async fn test_insight_failure_and_missing_table() {
    let client = active_client();
    let insights = InsightService::new(Arc::new(MockCompletion::new(Err(GenieError::api(
        503,
        "endpoint scaling",
    )))));

    let outcome = insights.generate(&client, "missing", None).await;
    assert_eq!(outcome, InsightOutcome::NoData);
    assert_eq!(outcome.text(), "No data available for insights.");

    {
        let mut state = client.lock().await;
        let session = state.ensure_current_session();
        session.push_user_turn("q");
        session.resolve_pending(MessageWidget::bot(BotContent::Table {
            table_id: "t-1".into(),
            table: sales_table(),
            sql: None,
        }));
    }

    let outcome = insights.generate(&client, "t-1", None).await;
    assert_eq!(
        outcome.text(),
        "Error generating insights: API error (503): endpoint scaling"
    );
}

#[tokio::test]
async fn test_space_listing_failure_degrades_to_empty() {
    let service = SpaceService::new(Arc::new(MockAgent::default()));
    let client = Mutex::new(ClientState::new());

    assert_eq!(service.refresh(&client, None).await, 0);
    let state = client.lock().await;
    assert!(state.selection.spaces().is_empty());
    assert!(!state.selection.is_active());
}

#[tokio::test]
async fn test_space_listing_populates_selection() {
    let agent = MockAgent {
        spaces: Some(vec![Space {
            space_id: "s1".into(),
            title: Some("Sales".into()),
            description: None,
        }]),
        ..Default::default()
    };
    let service = SpaceService::new(Arc::new(agent));
    let client = Mutex::new(ClientState::new());

    assert_eq!(service.refresh(&client, None).await, 1);
    assert_eq!(client.lock().await.selection.spaces()[0].label(), "Sales");
}
