//! Chat command handling. Read-only with respect to the partition table.

use tracing::{info, warn};

use crate::{
    dto::command::{CommandReply, InboundMessage},
    error::ServiceError,
    notify::ChannelId,
    services::messages,
    state::SharedState,
};

const COMMAND_PREFIXES: [&str; 2] = [".dclone", "!dclone"];

/// Whether `text` invokes the status command. Case-sensitive prefix match.
pub fn is_status_command(text: &str) -> bool {
    COMMAND_PREFIXES
        .iter()
        .any(|prefix| text.starts_with(prefix))
}

/// Render the status reply from a fresh snapshot, never from tracked state.
pub async fn status_message(state: &SharedState) -> String {
    let filter = state.config().filter;
    let reports = match state.status_source().fetch(filter).await {
        Ok(reports) => reports,
        Err(err) => {
            warn!(
                error = &err as &(dyn std::error::Error + 'static),
                "status fetch for chat command failed"
            );
            return messages::API_ERROR_REPLY.to_string();
        }
    };

    let walks = match state.walk_source() {
        Some(source) => match source.fetch().await {
            Ok(walks) => messages::relevant_walks(walks, &filter),
            Err(err) => {
                warn!(
                    error = &err as &(dyn std::error::Error + 'static),
                    "planned walk fetch for chat command failed"
                );
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    messages::status_message(&reports, &walks)
}

/// Answer an inbound chat message, replying in its channel when it is a command.
pub async fn handle_message(
    state: &SharedState,
    message: InboundMessage,
) -> Result<CommandReply, ServiceError> {
    let channel: ChannelId = message
        .channel_id
        .parse()
        .map_err(|_| ServiceError::InvalidInput(format!("bad channel id {}", message.channel_id)))?;

    if !is_status_command(&message.content) {
        return Ok(CommandReply::ignored());
    }

    info!(
        %channel,
        author = message.author.as_deref().unwrap_or("unknown"),
        "responding to status command"
    );
    let reply = status_message(state).await;
    let delivered = match state.sink().send(channel, reply.clone()).await {
        Ok(()) => true,
        Err(err) => {
            warn!(
                %channel,
                error = &err as &(dyn std::error::Error + 'static),
                "failed to deliver status reply"
            );
            false
        }
    };

    Ok(CommandReply {
        handled: true,
        reply: Some(reply),
        delivered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        notify::ChannelId,
        services::test_support::{
            FixedWalks, ScriptedStatus, TestHarness, report_at, softcore_europe_ladder,
        },
    };

    fn inbound(content: &str) -> InboundMessage {
        InboundMessage {
            channel_id: "77".into(),
            content: content.into(),
            author: Some("player#1".into()),
        }
    }

    #[test]
    fn recognises_exact_prefixes_only() {
        assert!(is_status_command(".dclone"));
        assert!(is_status_command("!dclone please"));
        assert!(!is_status_command(".DCLONE"));
        assert!(!is_status_command(" .dclone"));
        assert!(!is_status_command("dclone"));
    }

    #[tokio::test]
    async fn replies_in_originating_channel_without_touching_state() {
        let partition = softcore_europe_ladder();
        let harness = TestHarness::new(ScriptedStatus::new([Ok(vec![report_at(partition, 5)])]));
        let before = harness.state.tracker().lock().await.clone();

        let reply = handle_message(&harness.state, inbound(".dclone")).await.unwrap();

        assert!(reply.handled && reply.delivered);
        let sent = harness.sink.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChannelId(77));
        assert!(sent[0].1.contains("**Europe Ladder Softcore** is `5/6`"));
        let after = harness.state.tracker().lock().await.clone();
        assert_eq!(before.get(partition), after.get(partition));
    }

    #[tokio::test]
    async fn ignores_other_messages() {
        let harness = TestHarness::new(ScriptedStatus::empty());
        let reply = handle_message(&harness.state, inbound("hello")).await.unwrap();

        assert!(!reply.handled);
        assert_eq!(harness.status.calls(), 0);
        assert!(harness.sink.messages().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_renders_api_error() {
        let harness = TestHarness::new(ScriptedStatus::new([Err(ScriptedStatus::failure())]));
        let reply = status_message(&harness.state).await;
        assert_eq!(reply, messages::API_ERROR_REPLY);
    }

    #[tokio::test]
    async fn walk_failure_only_drops_the_walk_section() {
        let partition = softcore_europe_ladder();
        let harness = TestHarness::with_walks(
            ScriptedStatus::new([Ok(vec![report_at(partition, 2)])]),
            FixedWalks::new(Vec::new()),
        );
        harness.walks.as_ref().unwrap().fail();

        let reply = status_message(&harness.state).await;

        assert!(reply.starts_with("Current DClone Progress:\n"));
        assert!(!reply.contains("Planned Walks"));
    }
}
