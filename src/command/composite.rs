//! Command that aggregates a dynamic set of member commands

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard, Weak};

use async_trait::async_trait;
use tracing::{Level, event};

use crate::{
    command::execution,
    domain::{
        constant::composite,
        error::CommandError,
        event::{EventSource, SubscriptionId},
        outcome::{CommandId, ExecutionOutcome, ReadinessChanged},
        parameter::Parameter
    },
    port::command::Invocable
};

struct Member {
    command: Weak<dyn Invocable>,
    key:     usize,
    /// Forwards the member's readiness notifications to the composite's
    relay:   SubscriptionId
}

/// Identity of a command instance, independent of the pointer's vtable
fn identity<C: Invocable + ?Sized>(command: &Arc<C>) -> usize {
    Arc::as_ptr(command) as *const () as usize
}

/// Aggregates member commands.
///
/// Members are held weakly: whoever registers a command keeps it alive, and
/// dropped members silently leave the composite. The composite is ready when
/// every member is ready, and executing it triggers every member in
/// registration order.
///
/// Subscribers of [`Invocable::readiness_changed`] receive the notifications
/// of all members, including members registered after they subscribed.
pub struct CompositeCommand {
    id:        CommandId,
    name:      String,
    members:   RwLock<Vec<Member>>,
    readiness: Arc<EventSource<ReadinessChanged>>
}

impl CompositeCommand {
    pub fn new() -> Self {
        Self::named("composite_command")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id:        CommandId::new(),
            name:      name.into(),
            members:   RwLock::new(Vec::new()),
            readiness: Arc::new(EventSource::new())
        }
    }

    fn members_mut(&self) -> RwLockWriteGuard<'_, Vec<Member>> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop members whose command no longer exists
    fn prune(&self, members: &mut Vec<Member>) {
        let before = members.len();
        members.retain(|member| member.command.strong_count() > 0);
        let pruned = before - members.len();
        if pruned > 0 {
            event!(Level::DEBUG, event = composite::MEMBERS_PRUNED, composite = %self.name, pruned);
        }
    }

    /// Add `command` unless it is already a member. Returns whether it was added.
    ///
    /// The composite itself, or a command that contains it, is refused.
    pub fn register(&self, command: Arc<dyn Invocable>) -> bool {
        if command.id() == self.id || command.contains_command(self.id) {
            event!(Level::WARN, event = composite::REGISTRATION_REJECTED,
                   composite = %self.name, member = %command.name(), member_id = %command.id());
            return false;
        }

        let key = identity(&command);
        {
            let mut members = self.members_mut();
            self.prune(&mut members);
            if members.iter().any(|member| member.key == key) {
                return false;
            }

            let forward = Arc::downgrade(&self.readiness);
            let relay = command.readiness_changed().subscribe(move |event| {
                if let Some(readiness) = forward.upgrade() {
                    readiness.publish(event);
                }
            });
            members.push(Member { command: Arc::downgrade(&command), key, relay });
        }

        event!(Level::DEBUG, event = composite::MEMBER_REGISTERED,
               composite = %self.name, member = %command.name(), member_id = %command.id());
        self.publish_readiness();
        true
    }

    /// Remove `command` if it is a member. Returns whether it was removed.
    pub fn unregister<C: Invocable + ?Sized>(&self, command: &Arc<C>) -> bool {
        let key = identity(command);
        let removed = {
            let mut members = self.members_mut();
            let position = members.iter().position(|member| member.key == key);
            position.map(|index| members.remove(index))
        };

        let Some(member) = removed else {
            return false;
        };
        if let Some(live) = member.command.upgrade() {
            live.readiness_changed().unsubscribe(member.relay);
        }

        event!(Level::DEBUG, event = composite::MEMBER_UNREGISTERED,
               composite = %self.name, member = %command.name(), member_id = %command.id());
        self.publish_readiness();
        true
    }

    /// Live members in registration order
    pub fn members(&self) -> Vec<Arc<dyn Invocable>> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|member| member.command.upgrade())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish_readiness(&self) {
        self.readiness.publish(&ReadinessChanged {
            command_id:   self.id,
            command_name: self.name.clone(),
            is_executing: Invocable::is_executing(self)
        });
    }
}

impl Default for CompositeCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CompositeCommand {
    fn drop(&mut self) {
        let members = std::mem::take(self.members.get_mut().unwrap_or_else(PoisonError::into_inner));
        for member in members {
            if let Some(live) = member.command.upgrade() {
                live.readiness_changed().unsubscribe(member.relay);
            }
        }
    }
}

#[async_trait]
impl Invocable for CompositeCommand {
    fn id(&self) -> CommandId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    /// Logical AND over the members; true when there are none
    fn can_execute(&self, parameter: &Parameter) -> Result<bool, CommandError> {
        for member in self.members() {
            if !member.can_execute(parameter)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Trigger every member in registration order without waiting for any of them.
    ///
    /// A member that refuses does not stop the others; the first refusal is returned.
    fn execute(&self, parameter: &Parameter) -> Result<(), CommandError> {
        let members = self.members();
        event!(Level::DEBUG, event = composite::EXECUTION_TRIGGERED, composite = %self.name, members = members.len());

        let mut first_refusal = None;
        for member in members {
            if let Err(err) = member.execute(parameter) {
                event!(Level::WARN, event = composite::MEMBER_REFUSED,
                       composite = %self.name, member = %member.name(), error = %err);
                first_refusal.get_or_insert(err);
            }
        }
        first_refusal.map_or(Ok(()), Err)
    }

    /// Trigger every member, then wait for all of them
    async fn execute_and_wait(&self, parameter: &Parameter) -> Result<ExecutionOutcome, CommandError> {
        let runtime = execution::runtime()?;
        let members = self.members();
        event!(Level::DEBUG, event = composite::EXECUTION_TRIGGERED, composite = %self.name, members = members.len());

        let running: Vec<_> = members
            .into_iter()
            .map(|member| {
                let parameter = parameter.clone();
                runtime.spawn(async move { member.execute_and_wait(&parameter).await })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(running.len());
        for handle in running {
            let outcome = match handle.await {
                Ok(result) => result?,
                Err(join_err) => ExecutionOutcome::Failed(Arc::new(anyhow::anyhow!("member panicked: {}", join_err)))
            };
            outcomes.push(outcome);
        }
        Ok(ExecutionOutcome::combine(outcomes))
    }

    fn readiness_changed(&self) -> &EventSource<ReadinessChanged> {
        &self.readiness
    }

    fn is_executing(&self) -> bool {
        self.members().iter().any(|member| member.is_executing())
    }

    fn contains_command(&self, id: CommandId) -> bool {
        self.members().iter().any(|member| member.id() == id || member.contains_command(id))
    }
}
