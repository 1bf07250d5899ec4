//! Command-line surface: one subcommand per forum operation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use domains::{CallerId, Identifier};
use serde::Serialize;
use services::{ForumService, Receipt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Forum entity store")]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./rusty-forum.toml if present)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Verified identity of the caller, hex encoded
    #[arg(long, global = true)]
    pub caller: Option<CallerId>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every forum
    Forums,
    /// Show one forum
    Forum { id: Identifier },
    /// List every thread
    Threads,
    /// Show one thread
    Thread { id: Identifier },
    /// List the messages of one thread in posting order
    ThreadMessages { thread_id: Identifier },
    /// List every thread's messages
    Messages,
    /// List every user
    Users,
    /// Show one user
    User { id: CallerId },
    /// Show which update operations are in flight
    Flags,

    CreateForum {
        name: String,
        description: String,
    },
    CreateThread {
        name: String,
        description: String,
        forum_id: Identifier,
    },
    /// Post a message as --caller
    CreateMessage {
        content: String,
        /// Must start with ipfs://
        image_url: String,
        thread_id: Identifier,
    },
    /// Register --caller
    Register { name: String, avatar: String },
    /// Change the avatar of --caller
    ChangeAvatar { avatar: String },
}

fn json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to render output")
}

fn require_caller(caller: Option<&CallerId>) -> Result<&CallerId> {
    caller.context("this operation needs --caller <hex identity>")
}

/// Runs one command and returns what should be printed on success.
pub async fn dispatch(
    service: &ForumService,
    caller: Option<&CallerId>,
    command: Command,
) -> Result<String> {
    let output = match command {
        Command::Forums => json(&service.get_forums().await?)?,
        Command::Forum { id } => json(&service.get_forum(&id).await?)?,
        Command::Threads => json(&service.get_threads().await?)?,
        Command::Thread { id } => json(&service.get_thread(&id).await?)?,
        Command::ThreadMessages { thread_id } => {
            json(&service.get_thread_messages(&thread_id).await?)?
        }
        Command::Messages => json(&service.get_messages().await?)?,
        Command::Users => json(&service.get_users().await?)?,
        Command::User { id } => json(&service.get_user(&id).await?)?,
        Command::Flags => {
            let flags: Vec<_> = service
                .mutation_flags()
                .snapshot()
                .into_iter()
                .map(|(kind, set)| (kind.name(), set))
                .collect();
            json(&flags)?
        }

        Command::CreateForum { name, description } => {
            Receipt::ForumCreated(service.create_forum(name, description).await?).to_string()
        }
        Command::CreateThread {
            name,
            description,
            forum_id,
        } => {
            let id = service.create_thread(name, description, forum_id).await?;
            Receipt::ThreadCreated(id).to_string()
        }
        Command::CreateMessage {
            content,
            image_url,
            thread_id,
        } => {
            let caller = require_caller(caller)?;
            let id = service.create_message(caller, content, image_url, thread_id).await?;
            Receipt::MessageCreated(id).to_string()
        }
        Command::Register { name, avatar } => {
            let user = service.register(require_caller(caller)?, name, avatar).await?;
            Receipt::UserCreated(user.id).to_string()
        }
        Command::ChangeAvatar { avatar } => {
            service.change_avatar(require_caller(caller)?, avatar).await?;
            Receipt::AvatarUpdated.to_string()
        }
    };
    Ok(output)
}
