use crate::core::errors::PaytoolError;
use crate::core::feed::GroupFeed;
use crate::core::invite::parse_invite_link;
use crate::core::models::{Group, GroupMember, GroupStatus, MemberStatus, PaymentCard};
use crate::core::operations::{
    self, AuthPayload, CreatedGroup, GroupStatusPayload, MembershipPayload,
};
use crate::core::session::SessionContext;
use crate::core::view::GroupView;
use crate::infrastructure::graphql::{
    GraphqlRequest, GraphqlTransport, decode_field, decode_optional_field,
};
use crate::infrastructure::subscription::SubscriptionChannel;
use log::{debug, info, warn};
use serde_json::Value;

/// Outcome of following an invite link.
#[derive(Clone, Debug)]
pub enum InviteTarget {
    /// The session user already has a membership row; go straight to the
    /// group instead of joining again.
    AlreadyMember(Group),
    /// The group exists and the user may join it with a share amount.
    Joinable(Group),
}

/// Client-side service over the GraphQL transport. Holds the explicitly
/// injected session and drives the optimistic-update/reconcile flow on a
/// `GroupView`.
pub struct PaytoolService<T: GraphqlTransport> {
    transport: T,
    session: Option<SessionContext>,
}

impl<T: GraphqlTransport> PaytoolService<T> {
    pub fn new(transport: T) -> Self {
        info!("Initializing PaytoolService");
        PaytoolService {
            transport,
            session: None,
        }
    }

    pub fn with_session(transport: T, session: SessionContext) -> Self {
        let mut service = Self::new(transport);
        service.session = Some(session);
        service
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    /// Re-inject a session persisted by the caller (e.g. across restarts).
    pub fn restore_session(&mut self, session: SessionContext) {
        self.session = Some(session);
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Logging out {}", session.username);
        }
    }

    fn require_session(&self) -> Result<&SessionContext, PaytoolError> {
        self.session.as_ref().ok_or(PaytoolError::NotLoggedIn)
    }

    async fn execute(&self, request: GraphqlRequest) -> Result<Value, PaytoolError> {
        self.transport.execute(&request).await?.into_data()
    }

    // SESSION

    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<SessionContext, PaytoolError> {
        info!("Logging in {}", username);
        let data = self.execute(operations::login(username, password)).await?;
        let payload: AuthPayload = decode_field(data, "login")?;

        let session = SessionContext::new(payload.user.id, payload.user.username)
            .with_token(payload.token);
        self.session = Some(session.clone());
        Ok(session)
    }

    // GROUPS

    pub async fn create_group(
        &self,
        description: &str,
        total_amount: f64,
    ) -> Result<String, PaytoolError> {
        let session = self.require_session()?;
        info!(
            "Creating group '{}' with total {} for leader {}",
            description, total_amount, session.user_id
        );
        let data = self
            .execute(operations::create_group(
                description,
                total_amount,
                &session.user_id,
            ))
            .await?;
        let created: CreatedGroup = decode_field(data, "createGroup")?;
        debug!("Group created with id {}", created.id);
        Ok(created.id)
    }

    /// Join with the share amount the user takes on. The server derives the
    /// joining user from the session.
    pub async fn join_group(
        &self,
        group_id: &str,
        amount: f64,
    ) -> Result<MembershipPayload, PaytoolError> {
        let session = self.require_session()?;
        info!(
            "User {} joining group {} with amount {}",
            session.user_id, group_id, amount
        );
        let data = self
            .execute(operations::join_group(group_id, amount))
            .await?;
        decode_field(data, "joinGroup")
    }

    /// Fresh fetch of one group; null data means the group is gone and the
    /// caller should fall back to a safe view.
    pub async fn fetch_group(&self, group_id: &str) -> Result<Group, PaytoolError> {
        debug!("Fetching group {}", group_id);
        let data = self.execute(operations::group(group_id)).await?;
        decode_optional_field::<Group>(data, "group")?
            .ok_or_else(|| PaytoolError::GroupNotFound(group_id.to_string()))
    }

    pub async fn user_groups(&self) -> Result<Vec<Group>, PaytoolError> {
        let session = self.require_session()?;
        let data = self
            .execute(operations::user_groups(&session.user_id))
            .await?;
        decode_field(data, "userGroups")
    }

    /// Resolve an invite link to its group and report whether the session
    /// user still needs to join.
    pub async fn resolve_invite(&self, link: &str) -> Result<InviteTarget, PaytoolError> {
        let session = self.require_session()?;
        let group_id = parse_invite_link(link)?;
        let group = self.fetch_group(&group_id).await?;

        if group.is_member(&session.user_id) {
            debug!("User {} already in group {}", session.user_id, group.id);
            Ok(InviteTarget::AlreadyMember(group))
        } else {
            Ok(InviteTarget::Joinable(group))
        }
    }

    /// Selecting a group: re-fetch it, build its view and subscribe to its
    /// streams in one step.
    pub async fn open_group(
        &self,
        channel: &SubscriptionChannel,
        group_id: &str,
    ) -> Result<(GroupView, GroupFeed), PaytoolError> {
        let group = self.fetch_group(group_id).await?;
        let mut view = GroupView::new();
        view.load(group);
        Ok((view, GroupFeed::open(channel, group_id)))
    }

    // STATUS RECONCILIATION

    /// Agree/disagree flow: optimistic apply, one-shot mutation, revert on
    /// failure, then the all-agreed recomputation. The authoritative value
    /// still arrives later via the subscription push.
    pub async fn set_member_status(
        &self,
        view: &mut GroupView,
        status: MemberStatus,
    ) -> Result<(), PaytoolError> {
        let session = self.require_session()?;
        let Some(group) = view.group() else {
            return Err(PaytoolError::GroupNotFound(String::new()));
        };
        let group_id = group.id.clone();
        let member_id = group
            .member_for_user(&session.user_id)
            .map(|m| m.id.clone())
            .ok_or_else(|| {
                PaytoolError::NotGroupMember(session.user_id.clone(), group_id.clone())
            })?;

        view.stage_member_status(&member_id, status.clone());

        match self
            .execute(operations::update_member_status(
                &group_id,
                &session.user_id,
                &status,
            ))
            .await
        {
            Err(e) => {
                warn!("Member status update failed: {}", e);
                if view.is_attached() {
                    view.revert();
                }
                Err(e)
            }
            Ok(data) => {
                if !view.is_attached() {
                    debug!("Discarding mutation result for a left group view");
                    return Ok(());
                }
                view.commit();
                let _ack: MembershipPayload = decode_field(data, "updateMemberStatus")?;
                self.maybe_promote(view).await
            }
        }
    }

    /// Apply a `memberStatusChanged` push and rerun the consensus check.
    pub async fn apply_member_event(
        &self,
        view: &mut GroupView,
        member: GroupMember,
    ) -> Result<(), PaytoolError> {
        view.apply_member_push(member);
        self.maybe_promote(view).await
    }

    /// Apply a `groupStatusChanged` snapshot push and rerun the consensus
    /// check.
    pub async fn apply_group_event(
        &self,
        view: &mut GroupView,
        group: Group,
    ) -> Result<(), PaytoolError> {
        view.apply_group_push(group);
        self.maybe_promote(view).await
    }

    async fn maybe_promote(&self, view: &mut GroupView) -> Result<(), PaytoolError> {
        if !view.should_promote() {
            return Ok(());
        }
        let Some(group_id) = view.group().map(|g| g.id.clone()) else {
            return Ok(());
        };

        // Armed exactly once per transition into the fully-agreed state,
        // before the call, so a failure is not retried implicitly.
        view.mark_promotion_sent();
        info!("All members agreed, promoting group {} to ACTIVE", group_id);

        let data = self
            .execute(operations::update_group_status(
                &group_id,
                &GroupStatus::Active,
            ))
            .await?;
        let _ack: GroupStatusPayload = decode_field(data, "updateGroupStatus")?;
        view.mark_active();
        Ok(())
    }

    // PAYMENT

    /// Leader-only: mint a virtual card for the group total. A repeat call
    /// simply yields a fresh card; the previous one is not invalidated
    /// client-side.
    pub async fn generate_payment_card(
        &self,
        group_id: &str,
    ) -> Result<PaymentCard, PaytoolError> {
        let session = self.require_session()?;
        info!(
            "User {} generating payment card for group {}",
            session.user_id, group_id
        );
        let data = self
            .execute(operations::generate_payment_card(group_id))
            .await?;
        decode_field(data, "generatePaymentCard")
    }
}
