use std::{io, path::PathBuf, sync::Arc};

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    bindings::card::{Bindings, UrlCard},
    console::{
        command::{Command, HELP, ItemRef},
        view,
    },
    credential::store::CredentialStore,
    domain::{models::Credential, repository::ShortenedURLRepository},
    gate::Trigger,
    usecase::{
        mutation::MutationGateway,
        query::{ResourceQuery, UrlListState},
    },
};

const PROMPT: &str = "> ";

enum Flow {
    Continue(String),
    Quit,
}

/// Line-oriented admin console over the reactive core.
///
/// Commands that fetch wait for their result before the next line is read;
/// any other state change is rendered as soon as it is published.
pub struct Console<R> {
    credentials: Arc<CredentialStore>,
    query: ResourceQuery<R>,
    gateway: MutationGateway<R>,
    bindings: Bindings,
    cards: Vec<UrlCard>,
}

impl<R: ShortenedURLRepository> Console<R> {
    pub fn new(query: ResourceQuery<R>, bindings: Bindings) -> Self {
        Console {
            credentials: Arc::clone(query.credentials()),
            gateway: MutationGateway::new(query.clone()),
            query,
            bindings,
            cards: Vec::new(),
        }
    }

    pub async fn run<I, O>(mut self, input: I, mut out: O) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut states = self.query.subscribe();

        if let Some(credential) = self.credentials.get() {
            self.query.settled_for(&credential).await;
        }
        let initial = states.borrow_and_update().clone();
        write(&mut out, &self.apply(&initial)).await?;
        write(&mut out, PROMPT).await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => break,
                        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                            tracing::warn!(error = %e, "Skipping unreadable input line");
                            write(&mut out, "Input is not valid UTF-8\n").await?;
                            write(&mut out, PROMPT).await?;
                            continue;
                        }
                        Err(e) => return Err(e.into()),
                    };
                    let flow = self.handle(&line).await;
                    // results of awaited commands were already rendered
                    states.mark_unchanged();
                    match flow {
                        Flow::Continue(text) => {
                            write(&mut out, &text).await?;
                            write(&mut out, PROMPT).await?;
                        }
                        Flow::Quit => break,
                    }
                }
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = states.borrow_and_update().clone();
                    write(&mut out, &format!("\n{}", self.apply(&state))).await?;
                    write(&mut out, PROMPT).await?;
                }
            }
        }
        Ok(())
    }

    /// Syncs the per-record cards with `state` and renders it.
    fn apply(&mut self, state: &UrlListState) -> String {
        if let Some(urls) = state.data() {
            let previous = std::mem::take(&mut self.cards);
            self.cards = self.bindings.reconcile(previous, urls);
        }
        view::render_state(self.bindings.host(), state)
    }

    fn render_current(&mut self) -> String {
        let state = self.query.state();
        self.apply(&state)
    }

    async fn handle(&mut self, line: &str) -> Flow {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Flow::Continue(String::new()),
            Err(e) => return Flow::Continue(format!("{e}\n")),
        };
        tracing::debug!(command = redact(&command), "Handling command");

        let text = match command {
            Command::Login(password) => self.login(password).await,
            Command::List => self.render_current(),
            Command::Refresh => {
                self.query.refetch().await;
                self.render_current()
            }
            Command::New {
                short_path,
                target_url,
                comment,
            } => {
                let created = self.gateway.create(&short_path, &target_url, &comment);
                match created.await {
                    Ok(()) => self.render_current(),
                    Err(e) => format!("{e}\n"),
                }
            }
            Command::Copy(item) => self.copy(&item),
            Command::Qr { item, file } => self.qr(&item, file).await,
            Command::Delete { item, bypass } => self.delete(&item, bypass).await,
            Command::Help => format!("{HELP}\n"),
            Command::Quit => return Flow::Quit,
        };
        Flow::Continue(text)
    }

    async fn login(&mut self, password: String) -> String {
        let credential = Credential::new(password.clone());
        match self.credentials.set(password) {
            Ok(true) => {
                self.query.settled_for(&credential).await;
            }
            Ok(false) => self.query.refetch().await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist credential");
                return format!("Could not save the password: {e}\n");
            }
        }
        self.render_current()
    }

    fn find(&self, item: &ItemRef) -> Option<usize> {
        match item {
            ItemRef::Index(index) => index.checked_sub(1).filter(|i| *i < self.cards.len()),
            ItemRef::ShortUrl(short_url) => self
                .cards
                .iter()
                .position(|card| &card.record().short_url == short_url),
        }
    }

    fn missing(item: &ItemRef) -> String {
        match item {
            ItemRef::Index(index) => format!("No such item: {index}\n"),
            ItemRef::ShortUrl(short_url) => format!("No such item: {short_url}\n"),
        }
    }

    fn copy(&mut self, item: &ItemRef) -> String {
        let Some(index) = self.find(item) else {
            return Self::missing(item);
        };
        let card = &mut self.cards[index];
        card.copy();
        format!("{} {}\n", card.copy_label(), card.public_url())
    }

    async fn qr(&mut self, item: &ItemRef, file: Option<PathBuf>) -> String {
        let Some(index) = self.find(item) else {
            return Self::missing(item);
        };
        let card = &mut self.cards[index];
        let path = file.unwrap_or_else(|| PathBuf::from(card.download_name()));
        let public_url = card.public_url().to_string();

        let result = match card.show_qr().await {
            Ok(image) => tokio::fs::write(&path, image.png())
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(anyhow::Error::from(e)),
        };
        card.close_qr();

        match result {
            Ok(()) => format!("QR code for {public_url} saved to {}\n", path.display()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save QR code");
                format!("Could not save QR code: {e}\n")
            }
        }
    }

    async fn delete(&mut self, item: &ItemRef, bypass: bool) -> String {
        let Some(index) = self.find(item) else {
            return Self::missing(item);
        };
        let card = &mut self.cards[index];
        match card.delete(bypass, &self.gateway).await {
            Trigger::Armed => {
                let window = self.bindings.delete_window();
                view::render_pending_delete(self.bindings.host(), card, window.as_millis())
            }
            Trigger::Committed => self.render_current(),
        }
    }
}

async fn write<O: AsyncWrite + Unpin>(out: &mut O, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

fn redact(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::List => "list",
        Command::Refresh => "refresh",
        Command::New { .. } => "new",
        Command::Copy(_) => "copy",
        Command::Qr { .. } => "qr",
        Command::Delete { bypass: false, .. } => "delete",
        Command::Delete { bypass: true, .. } => "delete!",
        Command::Help => "help",
        Command::Quit => "quit",
    }
}
