//! Drives the agent from the chat panel.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::{AgentAction, AgentReply, AgentStrategy};
use crate::console::{Console, MessageKind};
use crate::workspace::SharedWorkspace;

/// Returned by [`AgentController::submit`] while the agent is switched off.
pub const AGENT_NOT_ACTIVE: &str = "Agent not active";

const DEFAULT_AGENT_NAME: &str = "CapptureAgent";
const DEFAULT_PROVIDER: &str = "gpt-4";

/// Snapshot of the agent's state for the status bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    /// Whether prompts are accepted.
    pub active: bool,
    /// Whether at least one prompt is awaiting a reply.
    pub processing: bool,
    /// Display name used as the reply sender.
    pub name: String,
    /// Model provider label.
    pub provider: String,
}

#[derive(Debug, Clone)]
struct Identity {
    name: String,
    provider: String,
}

/// Routes prompts to an [`AgentStrategy`] and applies its replies.
///
/// Several prompts may be in flight at once; each reply is appended to the
/// console when its own request completes.
pub struct AgentController {
    strategy: Arc<dyn AgentStrategy>,
    console: Arc<Mutex<Console>>,
    workspace: SharedWorkspace,
    active: AtomicBool,
    in_flight: AtomicUsize,
    identity: Mutex<Identity>,
}

impl std::fmt::Debug for AgentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentController")
            .field("active", &self.is_active())
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Decrements the in-flight counter when a submission finishes.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AgentController {
    /// Create an inactive controller.
    #[must_use]
    pub fn new(
        strategy: Arc<dyn AgentStrategy>,
        console: Arc<Mutex<Console>>,
        workspace: SharedWorkspace,
    ) -> Self {
        Self {
            strategy,
            console,
            workspace,
            active: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            identity: Mutex::new(Identity {
                name: DEFAULT_AGENT_NAME.to_string(),
                provider: DEFAULT_PROVIDER.to_string(),
            }),
        }
    }

    /// Whether prompts are accepted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Whether at least one prompt is awaiting a reply.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Switch the agent on or off. Replies already in flight still land.
    pub fn set_active(&self, active: bool) {
        let was = self.active.swap(active, Ordering::SeqCst);
        if was == active {
            return;
        }
        let name = self.name();
        if active {
            tracing::info!(agent = %name, "Agent activated");
            self.log(MessageKind::Success, format!("Agent {name} activated"));
        } else {
            tracing::info!(agent = %name, "Agent deactivated");
            self.log(MessageKind::Info, format!("Agent {name} deactivated"));
        }
    }

    /// Flip the active flag. Returns the new value.
    pub fn toggle(&self) -> bool {
        let next = !self.is_active();
        self.set_active(next);
        next
    }

    /// Display name used as the reply sender.
    #[must_use]
    pub fn name(&self) -> String {
        self.identity().name.clone()
    }

    /// Rename the agent.
    pub fn set_name(&self, name: impl Into<String>) {
        self.identity().name = name.into();
    }

    /// Change the provider label.
    pub fn set_provider(&self, provider: impl Into<String>) {
        self.identity().provider = provider.into();
    }

    /// Current state for display.
    #[must_use]
    pub fn status(&self) -> AgentStatus {
        let identity = self.identity().clone();
        AgentStatus {
            active: self.is_active(),
            processing: self.is_processing(),
            name: identity.name,
            provider: identity.provider,
        }
    }

    /// Send a prompt and wait for the reply.
    ///
    /// The prompt and the reply are both recorded in the console, and any
    /// actions in the reply are applied to the workspace. Returns the reply
    /// text, [`AGENT_NOT_ACTIVE`] if the agent is off, or `Error: ...` if the
    /// strategy failed.
    pub async fn submit(&self, prompt: &str) -> String {
        if !self.is_active() {
            self.post(MessageKind::System, None, "Please activate the agent first");
            return AGENT_NOT_ACTIVE.to_string();
        }

        let _in_flight = InFlight::enter(&self.in_flight);
        self.post(MessageKind::User, Some("You"), prompt);
        self.log(MessageKind::User, format!("User message: {prompt}"));

        match self.strategy.respond(prompt, &self.workspace).await {
            Ok(reply) => self.finish(reply),
            Err(e) => {
                tracing::error!(error = %e, "Agent request failed");
                let text = format!("Error: {e}");
                self.post(MessageKind::Error, None, text.clone());
                self.log(MessageKind::Error, text.clone());
                text
            }
        }
    }

    fn finish(&self, reply: AgentReply) -> String {
        for action in &reply.actions {
            self.apply(action);
        }
        let name = self.name();
        self.post(MessageKind::Agent, Some(&name), reply.response.clone());
        self.log(MessageKind::Agent, format!("Agent response: {}", reply.response));
        reply.response
    }

    fn apply(&self, action: &AgentAction) {
        match action {
            AgentAction::CreateFile {
                filename,
                filetype,
                content,
            } => {
                self.workspace
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .create_file(
                        filename.clone(),
                        filetype.clone().unwrap_or_else(|| "js".to_string()),
                        content.clone().unwrap_or_default(),
                    );
                self.log(MessageKind::Success, format!("File {filename} created"));
            }
            AgentAction::DeleteFile { id } => {
                let deleted = self
                    .workspace
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .delete_file(id);
                match deleted {
                    Ok(file) => {
                        self.log(MessageKind::Warning, format!("File {} deleted", file.name));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Agent asked to delete a missing file");
                        self.log(MessageKind::Warning, e.to_string());
                    }
                }
            }
            AgentAction::Unknown => {
                tracing::debug!("Ignoring unknown agent action");
            }
        }
    }

    fn identity(&self) -> std::sync::MutexGuard<'_, Identity> {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn post(&self, kind: MessageKind, sender: Option<&str>, text: impl Into<String>) {
        self.console
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .post(kind, sender, text);
    }

    fn log(&self, kind: MessageKind, text: impl Into<String>) {
        self.console
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .log(kind, text);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::agent::KeywordAgent;
    use crate::agent::DelayedAgent;
    use crate::error::AgentError;
    use crate::workspace::Workspace;

    /// Replies with the prompt after a prompt-specific delay.
    struct Scripted;

    #[async_trait]
    impl AgentStrategy for Scripted {
        async fn respond(
            &self,
            prompt: &str,
            _ws: &SharedWorkspace,
        ) -> Result<AgentReply, AgentError> {
            let delay = if prompt == "slow" { 200 } else { 50 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if prompt == "fail" {
                return Err(AgentError::Status(502));
            }
            Ok(AgentReply::text(format!("re: {prompt}")))
        }
    }

    type Harness = (AgentController, Arc<Mutex<Console>>, SharedWorkspace);

    fn controller(strategy: Arc<dyn AgentStrategy>) -> Harness {
        let console = Arc::new(Mutex::new(Console::default()));
        let workspace = Workspace::default().into_shared();
        let agent = AgentController::new(strategy, Arc::clone(&console), Arc::clone(&workspace));
        (agent, console, workspace)
    }

    #[tokio::test]
    async fn inactive_agent_refuses() {
        let (agent, console, _) = controller(Arc::new(KeywordAgent));

        let reply = agent.submit("hello").await;

        assert_eq!(reply, AGENT_NOT_ACTIVE);
        let console = console.lock().unwrap();
        assert_eq!(console.chat().len(), 1);
        assert_eq!(console.chat()[0].text, "Please activate the agent first");
    }

    #[tokio::test]
    async fn create_file_prompt_adds_file() {
        let (agent, console, workspace) = controller(Arc::new(KeywordAgent));
        agent.set_active(true);

        let reply = agent.submit("create file").await;

        assert_eq!(reply, "I've created a new file named \"new_file_4.js\" for you.");
        let ws = workspace.lock().unwrap();
        assert_eq!(ws.len(), 4);
        let created = ws.find_by_name("new_file_4.js").expect("created");
        assert_eq!(ws.active_file(), Some(created.id.as_str()));

        let console = console.lock().unwrap();
        let chat = console.chat();
        assert_eq!(chat[0].kind, MessageKind::User);
        assert_eq!(chat[0].sender.as_deref(), Some("You"));
        assert_eq!(chat[1].kind, MessageKind::Agent);
        assert_eq!(chat[1].sender.as_deref(), Some("CapptureAgent"));

        let lines: Vec<String> = console.terminal().iter().map(ToString::to_string).collect();
        assert!(lines.contains(&"USER: User message: create file".to_string()));
        assert!(lines.contains(&format!("AGENT: Agent response: {reply}")));
    }

    #[tokio::test]
    async fn delete_file_prompt_removes_first_file() {
        let (agent, _, workspace) = controller(Arc::new(KeywordAgent));
        agent.set_active(true);

        agent.submit("delete file").await;

        let ws = workspace.lock().unwrap();
        assert_eq!(ws.len(), 2);
        assert!(ws.get("index.html").is_none());
        assert_eq!(ws.active_file(), Some("style.css"));
    }

    #[tokio::test(start_paused = true)]
    async fn strategy_errors_are_reported() {
        let (agent, console, _) = controller(Arc::new(Scripted));
        agent.set_active(true);

        let reply = agent.submit("fail").await;

        assert_eq!(reply, "Error: Agent service returned status 502");
        assert_eq!(console.lock().unwrap().chat()[1].kind, MessageKind::Error);
        assert!(!agent.is_processing());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_submissions_land_in_completion_order() {
        let (agent, console, _) = controller(Arc::new(Scripted));
        agent.set_active(true);

        let (slow, fast) = futures::join!(agent.submit("slow"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(agent.is_processing());
            agent.submit("fast").await
        });

        assert_eq!(slow, "re: slow");
        assert_eq!(fast, "re: fast");
        assert!(!agent.is_processing());

        let console = console.lock().unwrap();
        let texts: Vec<&str> = console.chat().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["slow", "fast", "re: fast", "re: slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_create_prompts_pick_distinct_names() {
        let second = Duration::from_secs(1);
        let delayed = DelayedAgent::new(KeywordAgent, second, second);
        let (agent, _, workspace) = controller(Arc::new(delayed));
        agent.set_active(true);

        let (first, second) = futures::join!(agent.submit("create file"), agent.submit("new file"));

        assert_ne!(first, second);
        let ws = workspace.lock().unwrap();
        let names: Vec<&str> = ws.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["index.html", "style.css", "script.js", "new_file_4.js", "new_file_5.js"]
        );
    }

    #[test]
    fn toggle_logs_transitions() {
        let (agent, console, _) = controller(Arc::new(KeywordAgent));

        assert!(agent.toggle());
        assert!(!agent.toggle());
        agent.set_active(false);

        let console = console.lock().unwrap();
        let lines: Vec<String> = console.terminal().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "SUCCESS: Agent CapptureAgent activated",
                "INFO: Agent CapptureAgent deactivated",
            ]
        );
    }

    #[test]
    fn status_reflects_identity() {
        let (agent, _, _) = controller(Arc::new(KeywordAgent));
        agent.set_name("Helper");
        agent.set_provider("local");

        let status = agent.status();
        assert_eq!(
            status,
            AgentStatus {
                active: false,
                processing: false,
                name: "Helper".into(),
                provider: "local".into(),
            }
        );
    }

    #[tokio::test]
    async fn unknown_and_missing_actions_are_tolerated() {
        struct Odd;
        #[async_trait]
        impl AgentStrategy for Odd {
            async fn respond(
                &self,
                _: &str,
                _: &SharedWorkspace,
            ) -> Result<AgentReply, AgentError> {
                Ok(AgentReply::text("ok")
                    .with_action(AgentAction::Unknown)
                    .with_action(AgentAction::DeleteFile { id: "ghost".into() }))
            }
        }

        let (agent, _, workspace) = controller(Arc::new(Odd));
        agent.set_active(true);

        assert_eq!(agent.submit("x").await, "ok");
        assert_eq!(workspace.lock().unwrap().len(), 3);
    }
}
