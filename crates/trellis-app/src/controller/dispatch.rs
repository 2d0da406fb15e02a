//! Command routing.

use tracing::debug;
use trellis_common::WindowId;
use trellis_windows::WindowOp;

use crate::protocol::{ClientMessage, Reply, AUTH_SERVICE, FILE_SERVICE};

use super::command::{Command, Responder};
use super::{Controller, Flow};

/// Answer a request if anyone is waiting for it.
pub(super) fn reply(respond: Option<Responder>, reply: Reply) {
    if let Some(tx) = respond {
        let _ = tx.send(reply);
    }
}

impl Controller {
    pub fn handle_command(&mut self, command: Command) -> Flow {
        match command {
            Command::Surface {
                origin,
                message,
                respond,
            } => self.handle_surface(origin, message, respond),
            Command::Attach {
                window,
                outbox,
                respond,
            } => {
                let tracked = self.attach(window, outbox);
                let _ = respond.send(tracked);
                Flow::Continue
            }
            Command::Detach { window, outbox } => self.detach(window, &outbox),
            Command::Shutdown { done } => Flow::Stop(done),
        }
    }

    pub fn handle_surface(
        &mut self,
        origin: Option<WindowId>,
        message: ClientMessage,
        respond: Option<Responder>,
    ) -> Flow {
        debug!(origin = ?origin, kind = message.kind(), "dispatching");

        match message {
            ClientMessage::OpenSecondary { route } => reply(respond, self.open_secondary(&route)),
            ClientMessage::CloseMostRecentSecondary => {
                reply(respond, self.close_most_recent_secondary())
            }
            ClientMessage::MinimizeWindow => {
                return self.window_op(origin, WindowOp::Minimize, respond)
            }
            ClientMessage::MaximizeWindow => {
                return self.window_op(origin, WindowOp::Maximize, respond)
            }
            ClientMessage::RestoreWindow => {
                return self.window_op(origin, WindowOp::Restore, respond)
            }
            ClientMessage::CloseWindow => return self.window_op(origin, WindowOp::Close, respond),
            ClientMessage::IsMaximized => {
                return self.window_op(origin, WindowOp::QueryMaximized, respond)
            }

            ClientMessage::StateUpdate { patch } => self.state_update(origin, patch),
            ClientMessage::LoadComplete => self.load_complete(origin),
            ClientMessage::GetInitialState => reply(respond, Reply::State(self.store.snapshot())),
            ClientMessage::GetInitialLanguageState => {
                reply(respond, Reply::Language(self.store.language()))
            }

            ClientMessage::ProxyRequest {
                service,
                request,
                rewrite,
            } => self.proxy_request(&service, request, rewrite.as_deref(), respond),
            ClientMessage::AuthRequest { request } => {
                self.proxy_request(AUTH_SERVICE, request, None, respond)
            }
            ClientMessage::FileRequest { request } => {
                self.proxy_request(FILE_SERVICE, request, None, respond)
            }
            ClientMessage::GetProxyConfig { service } => {
                reply(respond, Reply::Config(self.registry.get(&service).cloned()))
            }
            ClientMessage::GetAllProxyConfigs => {
                reply(respond, Reply::Configs(self.registry.all().clone()))
            }
            ClientMessage::UpdateProxyConfig { service, updates } => {
                reply(respond, self.update_proxy_config(&service, &updates))
            }
            ClientMessage::ProxyHealthCheck => self.proxy_health_check(respond),
        }

        Flow::Continue
    }
}
