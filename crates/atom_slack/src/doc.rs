// File: crates/atom_slack/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    __path_briefing_handler, __path_list_channels_handler, __path_read_message_handler,
    __path_search_handler, __path_send_message_handler,
};
use crate::models::{
    BriefingData, ChannelList, SendMessageRequest, SentMessage, SlackChannel, SlackMessage,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        list_channels_handler,
        send_message_handler,
        search_handler,
        read_message_handler,
        briefing_handler
    ),
    components(schemas(
        SlackChannel,
        ChannelList,
        SendMessageRequest,
        SentMessage,
        SlackMessage,
        BriefingData
    )),
    tags(
        (name = "Slack", description = "Slack channels, messages and search")
    ),
    servers(
        (url = "/api", description = "Atom API server")
    )
)]
pub struct SlackApiDoc;
