use super::models::{MessagesView, TodoView};
use super::parse::{parse_messages, parse_todo};
use crate::components::fetch::Fetcher;
use crate::config::Config;
use crate::error::{component_error, config_error, BoardResult};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// The bulletin actor that owns the messages and todo content
pub struct BulletinActor {
    fetcher: Arc<dyn Fetcher>,
    messages_url: Option<String>,
    todo_url: Option<String>,
    max_messages: usize,
    max_todo_items: usize,
    locale: String,
    messages: MessagesView,
    todo: TodoView,
    command_rx: mpsc::Receiver<BulletinCommand>,
}

/// Commands that can be sent to the bulletin actor
pub enum BulletinCommand {
    RefreshMessages(mpsc::Sender<BoardResult<MessagesView>>),
    RefreshTodo(mpsc::Sender<BoardResult<TodoView>>),
    Messages(mpsc::Sender<BoardResult<MessagesView>>),
    Todo(mpsc::Sender<BoardResult<TodoView>>),
    Shutdown,
}

/// Handle for communicating with the bulletin actor
#[derive(Clone)]
pub struct BulletinActorHandle {
    command_tx: mpsc::Sender<BulletinCommand>,
}

impl BulletinActorHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(mpsc::Sender<BoardResult<T>>) -> BulletinCommand,
    ) -> BoardResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(command(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Re-read the messages sheet; an error leaves the previous messages in place
    pub async fn refresh_messages(&self) -> BoardResult<MessagesView> {
        self.request(BulletinCommand::RefreshMessages).await
    }

    /// Re-read the todo sheet; an error leaves the previous table in place
    pub async fn refresh_todo(&self) -> BoardResult<TodoView> {
        self.request(BulletinCommand::RefreshTodo).await
    }

    pub async fn messages(&self) -> BoardResult<MessagesView> {
        self.request(BulletinCommand::Messages).await
    }

    pub async fn todo(&self) -> BoardResult<TodoView> {
        self.request(BulletinCommand::Todo).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BoardResult<()> {
        let _ = self.command_tx.send(BulletinCommand::Shutdown).await;
        Ok(())
    }
}

impl BulletinActor {
    /// Create a new actor and return its handle
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>) -> (Self, BulletinActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            fetcher,
            messages_url: config.messages_sheet_url.clone(),
            todo_url: config.todo_sheet_url.clone(),
            max_messages: config.max_messages,
            max_todo_items: config.max_todo_items,
            locale: config.board_locale.clone(),
            messages: MessagesView::default(),
            todo: TodoView::default(),
            command_rx,
        };

        (actor, BulletinActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Bulletin actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                BulletinCommand::RefreshMessages(response_tx) => {
                    let result = self.refresh_messages().await;
                    let _ = response_tx.send(result).await;
                }
                BulletinCommand::RefreshTodo(response_tx) => {
                    let result = self.refresh_todo().await;
                    let _ = response_tx.send(result).await;
                }
                BulletinCommand::Messages(response_tx) => {
                    let _ = response_tx.send(Ok(self.messages.clone())).await;
                }
                BulletinCommand::Todo(response_tx) => {
                    let _ = response_tx.send(Ok(self.todo.clone())).await;
                }
                BulletinCommand::Shutdown => {
                    info!("Bulletin actor shutting down");
                    break;
                }
            }
        }

        info!("Bulletin actor shut down");
    }

    async fn fetch(&self, url: Option<&str>, what: &str) -> BoardResult<String> {
        let url = url.ok_or_else(|| config_error(&format!("{} sheet URL is not configured", what)))?;
        self.fetcher.fetch_text(url).await
    }

    async fn refresh_messages(&mut self) -> BoardResult<MessagesView> {
        match self.fetch(self.messages_url.as_deref(), "Messages").await {
            Ok(text) => {
                self.messages.messages = parse_messages(&text, self.max_messages);
                self.messages.updated_at = Some(Utc::now());
                self.messages.error = None;
                info!("Loaded {} team messages", self.messages.messages.len());
                Ok(self.messages.clone())
            }
            Err(e) => {
                error!("Error fetching messages: {}", e);
                self.messages.error =
                    Some(t!("messages_unavailable", locale = self.locale.as_str()).to_string());
                Err(e)
            }
        }
    }

    async fn refresh_todo(&mut self) -> BoardResult<TodoView> {
        match self.fetch(self.todo_url.as_deref(), "Todo").await {
            Ok(text) => {
                let table = parse_todo(&text, self.max_todo_items);
                self.todo.notice = match table {
                    Some(_) => None,
                    None => Some(t!("todo_empty", locale = self.locale.as_str()).to_string()),
                };
                self.todo.table = table;
                self.todo.updated_at = Some(Utc::now());
                self.todo.error = None;
                Ok(self.todo.clone())
            }
            Err(e) => {
                error!("Error fetching todo list: {}", e);
                self.todo.error =
                    Some(t!("todo_unavailable", locale = self.locale.as_str()).to_string());
                Err(e)
            }
        }
    }
}
