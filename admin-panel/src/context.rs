//! Per-request view of the panel: the browser's session, a gateway tagged
//! with the request id, and the shared state.

use crate::api::{ApiEnvelope, ApiGateway, ApiMethod, GatewayOutcome, OutboundPayload};
use crate::error::{PanelError, PanelResult};
use crate::models::notice::Notice;
use crate::models::session::Session;
use crate::services::session_store;
use crate::views::Chrome;
use crate::AppState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;

pub struct Panel {
    store: tower_sessions::Session,
    pub session: Session,
    gateway: ApiGateway,
    pub state: AppState,
}

#[async_trait]
impl FromRequestParts<AppState> for Panel {
    type Rejection = PanelError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let store = tower_sessions::Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| PanelError::App(AppError::SessionError(msg.to_string())))?;
        let session = session_store::load(&store).await?;
        let request_id = parts.extensions.get::<RequestId>().map(|id| id.0.clone());

        Ok(Self {
            store,
            session,
            gateway: state.gateway.for_request(request_id),
            state: state.clone(),
        })
    }
}

impl Panel {
    /// Unguarded upstream call. A lost authentication is persisted before
    /// the error is returned.
    pub async fn call(
        &mut self,
        method: ApiMethod,
        endpoint: &str,
        payload: OutboundPayload,
    ) -> PanelResult<ApiEnvelope> {
        let outcome = self
            .gateway
            .request(&mut self.session, method, endpoint, payload)
            .await;
        self.settle(outcome).await
    }

    pub async fn get(&mut self, endpoint: &str, query: OutboundPayload) -> PanelResult<ApiEnvelope> {
        self.call(ApiMethod::Get, endpoint, query).await
    }

    /// Superadmin-gated upstream call. On refusal the notice is flashed and
    /// nothing is sent.
    pub async fn mutate(
        &mut self,
        method: ApiMethod,
        endpoint: &str,
        payload: OutboundPayload,
        redirect_to: &str,
    ) -> PanelResult<ApiEnvelope> {
        let outcome = self
            .gateway
            .guarded_request(&mut self.session, method, endpoint, payload, redirect_to)
            .await;
        match outcome {
            Ok(outcome) => self.settle(outcome).await,
            Err(denied) => {
                tracing::warn!(endpoint = %endpoint, method = method.as_str(), "Mutation refused: not a superadmin");
                self.flash(denied.notice).await?;
                Err(PanelError::AccessDenied {
                    redirect_to: denied.redirect_to,
                })
            }
        }
    }

    /// Gate for pages that only lead to a mutation, such as create and edit
    /// forms.
    pub async fn require_super_admin(&mut self, redirect_to: &str) -> PanelResult<()> {
        if let Err(denied) = crate::api::require_super_admin(&self.session, redirect_to) {
            self.flash(denied.notice).await?;
            return Err(PanelError::AccessDenied {
                redirect_to: denied.redirect_to,
            });
        }
        Ok(())
    }

    pub fn is_super_admin(&self) -> bool {
        crate::api::is_super_admin(&self.session)
    }

    pub async fn flash(&self, notice: Notice) -> PanelResult<()> {
        session_store::flash(&self.store, &notice).await?;
        Ok(())
    }

    pub async fn take_notice(&self) -> PanelResult<Option<Notice>> {
        Ok(session_store::take_notice(&self.store).await?)
    }

    pub async fn has_notice(&self) -> PanelResult<bool> {
        Ok(session_store::has_notice(&self.store).await?)
    }

    /// Stores a fresh login under a new session id.
    pub async fn sign_in(&mut self, session: Session) -> PanelResult<()> {
        self.store.cycle_id().await?;
        self.session = session;
        self.save().await
    }

    pub async fn sign_out(&mut self) -> PanelResult<()> {
        self.session.clear();
        self.save().await
    }

    /// Persist the in-memory session.
    pub async fn save(&self) -> PanelResult<()> {
        session_store::save(&self.store, &self.session).await?;
        Ok(())
    }

    /// Page chrome with the pending notice consumed.
    pub async fn chrome(&self, active: &'static str) -> PanelResult<Chrome> {
        let notice = self.take_notice().await?;
        Ok(Chrome::new(&self.session, active, notice))
    }

    async fn settle(&mut self, outcome: GatewayOutcome) -> PanelResult<ApiEnvelope> {
        match outcome {
            GatewayOutcome::Envelope(envelope) => Ok(envelope),
            GatewayOutcome::AuthLost => {
                self.expire().await?;
                Err(PanelError::AuthLost)
            }
        }
    }

    async fn expire(&mut self) -> PanelResult<()> {
        self.session.clear();
        session_store::clear(&self.store).await?;
        self.flash(Notice::session_expired()).await
    }
}
