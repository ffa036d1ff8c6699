// src/clients/ssh.rs
use super::{RemoteShell, SshTarget};
use crate::error::{Result, ScenarioError};
use crate::poll::wait_for_condition;
use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::PublicKey;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// How long a command may take to hand control back to the shell.
const EXEC_TIMEOUT: Duration = Duration::from_secs(30);

/// Freshly booted test servers present unknown host keys.
struct AcceptAnyHostKey;

#[async_trait]
impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Remote shell over SSH with public-key authentication.
pub struct SshShell {
    config: Arc<client::Config>,
    retry_interval: Duration,
}

impl SshShell {
    pub fn new(retry_interval: Duration) -> Self {
        Self {
            config: Arc::new(client::Config::default()),
            retry_interval,
        }
    }

    async fn connect(&self, target: &SshTarget) -> Result<Handle<AcceptAnyHostKey>> {
        let key = Arc::new(russh_keys::decode_secret_key(&target.private_key, None)?);

        let mut session =
            client::connect(self.config.clone(), (target.host, target.port), AcceptAnyHostKey).await?;

        let authenticated = session
            .authenticate_publickey(target.user.clone(), key)
            .await?;
        if !authenticated {
            return Err(ScenarioError::Ssh(format!(
                "public key rejected for {}@{}",
                target.user, target.host
            )));
        }

        Ok(session)
    }

    async fn exec(&self, session: &Handle<AcceptAnyHostKey>, command: &str) -> Result<()> {
        let mut channel = session.channel_open_session().await?;
        channel.exec(true, command).await?;

        let mut accepted = false;
        let end = timeout(EXEC_TIMEOUT, async {
            while let Some(msg) = channel.wait().await {
                match msg {
                    ChannelMsg::Success => accepted = true,
                    ChannelMsg::Failure => return ExecEnd::Rejected,
                    ChannelMsg::ExitStatus { exit_status } => return ExecEnd::Exited(exit_status),
                    ChannelMsg::Close => break,
                    _ => {}
                }
            }
            ExecEnd::Closed
        })
        .await
        .unwrap_or(ExecEnd::TimedOut);

        settle(command, accepted, end)
    }
}

/// How waiting on an exec request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecEnd {
    Exited(u32),
    Closed,
    Rejected,
    TimedOut,
}

/// Listener commands background themselves, so some shells keep the
/// channel open with no exit status. Once the server accepted the request
/// that is still a successful start.
fn settle(command: &str, accepted: bool, end: ExecEnd) -> Result<()> {
    match end {
        ExecEnd::Exited(0) | ExecEnd::Closed => Ok(()),
        ExecEnd::TimedOut if accepted => {
            debug!("No exit status within {:?}, assuming started: {}", EXEC_TIMEOUT, command);
            Ok(())
        }
        ExecEnd::TimedOut => Err(ScenarioError::Ssh(format!(
            "exec request not acknowledged within {:?}: {}",
            EXEC_TIMEOUT, command
        ))),
        ExecEnd::Rejected => Err(ScenarioError::Ssh(format!("exec request rejected: {}", command))),
        ExecEnd::Exited(code) => Err(ScenarioError::Ssh(format!(
            "command exited with {}: {}",
            code, command
        ))),
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn run_detached(&self, target: &SshTarget, commands: &[String]) -> Result<()> {
        let what = format!("ssh {}@{}:{}", target.user, target.host, target.port);
        let label = what.as_str();

        // The server accepts connections some time after it reports ACTIVE.
        let session = wait_for_condition(label, target.timeout, self.retry_interval, || async move {
            match self.connect(target).await {
                Ok(session) => Ok(Some(session)),
                Err(e) => {
                    debug!("{} not ready: {}", label, e);
                    Ok(None)
                }
            }
        })
        .await?;

        for command in commands {
            debug!("{}: {}", what, command);
            self.exec(&session, command).await?;
        }

        info!("Ran {} command(s) on {}", commands.len(), target.host);
        session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}
