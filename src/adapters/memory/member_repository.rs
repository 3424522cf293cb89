use crate::domain::{member::Member, value_objects::MemberId};
use crate::ports::error::StoreError;
use crate::ports::member_repository::{MemberRepository, Result};
use async_trait::async_trait;

use super::{InMemoryLibrary, Sequenced, ordered};

#[async_trait]
impl MemberRepository for InMemoryLibrary {
    async fn list(&self) -> Result<Vec<Member>> {
        Ok(ordered(&self.state.read().members))
    }

    async fn get(&self, member_id: MemberId) -> Result<Option<Member>> {
        Ok(self
            .state
            .read()
            .members
            .get(&member_id)
            .map(|m| m.record.clone()))
    }

    async fn insert(&self, member: Member) -> Result<()> {
        let mut state = self.state.write();
        if state.email_taken(&member.email, None) {
            return Err(StoreError::EmailTaken(member.email.to_string()));
        }

        let seq = state.next_seq();
        state.members.insert(
            member.member_id,
            Sequenced {
                seq,
                record: member,
            },
        );
        Ok(())
    }

    async fn update(&self, member: Member) -> Result<Member> {
        let mut state = self.state.write();
        if !state.members.contains_key(&member.member_id) {
            return Err(StoreError::MemberNotFound(member.member_id));
        }
        if state.email_taken(&member.email, Some(member.member_id)) {
            return Err(StoreError::EmailTaken(member.email.to_string()));
        }

        let stored = state
            .members
            .get_mut(&member.member_id)
            .ok_or(StoreError::MemberNotFound(member.member_id))?;
        stored.record = Member {
            created_at: stored.record.created_at,
            ..member
        };

        Ok(stored.record.clone())
    }

    async fn delete(&self, member_id: MemberId) -> Result<()> {
        let mut state = self.state.write();
        if !state.members.contains_key(&member_id) {
            return Err(StoreError::MemberNotFound(member_id));
        }
        if state.has_open_loan_for_member(member_id) {
            return Err(StoreError::MemberHasOpenLoans(member_id));
        }

        state.loans.retain(|_, l| l.record.member_id != member_id);
        state.members.remove(&member_id);
        Ok(())
    }
}
