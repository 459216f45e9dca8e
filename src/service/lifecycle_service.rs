// service/lifecycle_service.rs
use std::{str::FromStr, sync::Arc};

use chrono::Utc;

use crate::{
    db::{Collections, DBClient},
    models::{
        inspectionmodel::{Inspection, JobStatus},
        usermodel::{User, UserRole},
    },
    service::error::ServiceError,
};

/// How strictly status changes are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Portal behaviour before role and order checks existed: any user may
    /// accept any job from any status, and any status may be written over
    /// any other. Kept for compatibility with existing clients.
    Legacy,
    /// Every change is checked against [`can_transition`].
    Hardened,
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(TransitionPolicy::Legacy),
            "hardened" => Ok(TransitionPolicy::Hardened),
            other => Err(format!("unknown lifecycle policy '{}'", other)),
        }
    }
}

/// Statuses from which a contractor may take a job.
pub const ACCEPTABLE_STATUSES: [JobStatus; 3] =
    [JobStatus::ReportSent, JobStatus::Approved, JobStatus::Assigned];

/// Policy table for the hardened lifecycle.
///
/// | role       | from                             | to          |
/// |------------|----------------------------------|-------------|
/// | any        | s                                | s (no-op)   |
/// | Admin      | s                                | next(s)     |
/// | Contractor | Report Sent, Approved, Assigned  | In Progress |
/// | Contractor | In Progress                      | Complete    |
///
/// Everything else is refused, including every property manager move.
/// Ownership of the job is checked separately.
pub fn can_transition(role: UserRole, from: JobStatus, to: JobStatus) -> bool {
    if from == to {
        return true;
    }

    match role {
        UserRole::Admin => from.next() == Some(to),
        UserRole::Contractor => match to {
            JobStatus::InProgress => ACCEPTABLE_STATUSES.contains(&from),
            JobStatus::Complete => from == JobStatus::InProgress,
            _ => false,
        },
        UserRole::PropertyManager => false,
    }
}

fn job_mut<'a>(tx: &'a mut Collections, job_id: &str) -> Result<&'a mut Inspection, ServiceError> {
    tx.inspection_mut(job_id)
        .map_err(|_| ServiceError::JobNotFound(job_id.to_string()))
}

fn unauthorized(actor: &User, job_id: &str) -> ServiceError {
    ServiceError::UnauthorizedJobAccess {
        user_id: actor.id.clone(),
        job_id: job_id.to_string(),
    }
}

fn require_admin(actor: &User, action: &str) -> Result<(), ServiceError> {
    if actor.role == UserRole::Admin {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!("only administrators may {}", action)))
    }
}

fn is_finished(status: JobStatus) -> bool {
    status >= JobStatus::Complete
}

/// Keeps completion bookkeeping in line with a status change. Entering
/// Complete or later stamps the completion date and credits the holder's
/// profile once; leaving it clears the date and takes the credit back.
fn sync_completion(
    tx: &mut Collections,
    job_id: &str,
    previous: JobStatus,
    current: JobStatus,
) -> Result<(), ServiceError> {
    let credit = match (is_finished(previous), is_finished(current)) {
        (false, true) => true,
        (true, false) => false,
        _ => return Ok(()),
    };

    let job = job_mut(tx, job_id)?;
    job.completion_date = if credit {
        Some(job.completion_date.unwrap_or_else(|| Utc::now().date_naive()))
    } else {
        None
    };
    let holder = job.contractor_id.clone();

    let profile_id = match holder.as_deref() {
        Some(holder) => tx.contractor_by_user(holder).map(|profile| profile.id.clone()),
        None => None,
    };
    if let Some(profile_id) = profile_id {
        let profile = tx.contractor_mut(&profile_id)?;
        profile.jobs_completed = if credit {
            profile.jobs_completed + 1
        } else {
            profile.jobs_completed.saturating_sub(1)
        };
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct LifecycleService {
    db_client: Arc<DBClient>,
    policy: TransitionPolicy,
}

impl LifecycleService {
    pub fn new(db_client: Arc<DBClient>, policy: TransitionPolicy) -> Self {
        Self { db_client, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// A contractor takes a job: status becomes In Progress and the job is
    /// held by the actor. Nothing else on the record changes.
    pub async fn accept_job(&self, job_id: &str, actor: &User) -> Result<Inspection, ServiceError> {
        let policy = self.policy;

        let job = self
            .db_client
            .transact(|tx| {
                let job = job_mut(tx, job_id)?;

                if policy == TransitionPolicy::Hardened {
                    if actor.role != UserRole::Contractor {
                        return Err(unauthorized(actor, job_id));
                    }
                    if job.contractor_id.as_ref().is_some_and(|holder| *holder != actor.id) {
                        return Err(unauthorized(actor, job_id));
                    }
                    if !can_transition(actor.role, job.status, JobStatus::InProgress) {
                        return Err(ServiceError::IllegalTransition {
                            job_id: job_id.to_string(),
                            from: job.status,
                            to: JobStatus::InProgress,
                        });
                    }
                }

                let previous = job.status;
                job.status = JobStatus::InProgress;
                // reopening a finished job debits the previous holder
                sync_completion(tx, job_id, previous, JobStatus::InProgress)?;
                let job = job_mut(tx, job_id)?;
                job.contractor_id = Some(actor.id.clone());
                Ok(job.clone())
            })
            .await?;

        tracing::info!("job {} accepted by {}", job_id, actor.id);
        Ok(job)
    }

    /// Moves a job to `new_status`. Re-applying the current status changes
    /// nothing.
    pub async fn update_job_status(
        &self,
        job_id: &str,
        new_status: JobStatus,
        actor: &User,
    ) -> Result<Inspection, ServiceError> {
        let policy = self.policy;

        let (job, previous) = self
            .db_client
            .transact(|tx| {
                let job = job_mut(tx, job_id)?;
                let previous = job.status;

                if policy == TransitionPolicy::Legacy {
                    job.status = new_status;
                    sync_completion(tx, job_id, previous, new_status)?;
                    let job = job_mut(tx, job_id)?.clone();
                    return Ok((job, previous));
                }

                match actor.role {
                    UserRole::Admin => {}
                    UserRole::Contractor if job.is_held_by(&actor.id) => {}
                    _ => return Err(unauthorized(actor, job_id)),
                }

                if !can_transition(actor.role, previous, new_status) {
                    return Err(ServiceError::IllegalTransition {
                        job_id: job_id.to_string(),
                        from: previous,
                        to: new_status,
                    });
                }

                if previous == new_status {
                    return Ok((job.clone(), previous));
                }

                job.status = new_status;
                sync_completion(tx, job_id, previous, new_status)?;

                let job = job_mut(tx, job_id)?.clone();
                Ok((job, previous))
            })
            .await?;

        if previous != new_status {
            tracing::info!("job {} moved {} -> {} by {}", job_id, previous, new_status, actor.id);
        }
        Ok(job)
    }

    /// Admin hands an approved job to a contractor.
    pub async fn assign_job(
        &self,
        job_id: &str,
        contractor_user_id: &str,
        actor: &User,
    ) -> Result<Inspection, ServiceError> {
        require_admin(actor, "assign jobs")?;
        let policy = self.policy;

        let job = self
            .db_client
            .transact(|tx| {
                let assignee_is_contractor = tx
                    .user(contractor_user_id)
                    .map(|user| user.role == UserRole::Contractor);
                match assignee_is_contractor {
                    Some(true) => {}
                    Some(false) => {
                        return Err(ServiceError::Validation(format!(
                            "user {} is not a contractor",
                            contractor_user_id
                        )))
                    }
                    None => return Err(ServiceError::UserNotFound(contractor_user_id.to_string())),
                }

                let job = job_mut(tx, job_id)?;
                if policy == TransitionPolicy::Hardened
                    && job.status != JobStatus::Assigned
                    && !can_transition(actor.role, job.status, JobStatus::Assigned)
                {
                    return Err(ServiceError::IllegalTransition {
                        job_id: job_id.to_string(),
                        from: job.status,
                        to: JobStatus::Assigned,
                    });
                }

                let previous = job.status;
                job.status = JobStatus::Assigned;
                // reopening a finished job debits the previous holder
                sync_completion(tx, job_id, previous, JobStatus::Assigned)?;
                let job = job_mut(tx, job_id)?;
                job.contractor_id = Some(contractor_user_id.to_string());
                Ok(job.clone())
            })
            .await?;

        tracing::info!("job {} assigned to {} by {}", job_id, contractor_user_id, actor.id);
        Ok(job)
    }

    /// Admin-only escape hatch: sets any status, backwards included,
    /// without consulting the policy table. Completion bookkeeping still
    /// follows the new status.
    pub async fn override_job_status(
        &self,
        job_id: &str,
        new_status: JobStatus,
        actor: &User,
    ) -> Result<Inspection, ServiceError> {
        require_admin(actor, "override job status")?;

        let (job, previous) = self
            .db_client
            .transact(|tx| {
                let job = job_mut(tx, job_id)?;
                let previous = job.status;
                job.status = new_status;
                sync_completion(tx, job_id, previous, new_status)?;
                let job = job_mut(tx, job_id)?.clone();
                Ok::<_, ServiceError>((job, previous))
            })
            .await?;

        tracing::warn!(
            "job {} status overridden {} -> {} by {}",
            job_id,
            previous,
            new_status,
            actor.id
        );
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{contractordb::ContractorExt, inspectiondb::InspectionExt, userdb::UserExt, StoreError},
        models::usermodel::NewUser,
    };

    async fn setup(policy: TransitionPolicy) -> (Arc<DBClient>, LifecycleService, User, User, User) {
        let db_client = Arc::new(DBClient::seeded("admin@example.com"));
        let admin = db_client.get_user(Some("u1"), None).await.unwrap().unwrap();
        let contractor = db_client
            .save_user(NewUser::new("jane", "jane@contractor.com", UserRole::Contractor))
            .await
            .unwrap();
        let manager = db_client
            .save_user(NewUser::new("marge", "marge@example.com", UserRole::PropertyManager))
            .await
            .unwrap();
        let service = LifecycleService::new(db_client.clone(), policy);
        (db_client, service, admin, contractor, manager)
    }

    async fn link_profile(db_client: &DBClient, contractor: &User) {
        db_client
            .transact(|tx| -> Result<(), StoreError> {
                tx.contractor_mut("c1")?.user_id = Some(contractor.id.clone());
                Ok(())
            })
            .await
            .unwrap();
    }

    async fn jobs_completed(db_client: &DBClient) -> u32 {
        db_client.get_contractor("c1").await.unwrap().unwrap().jobs_completed
    }

    async fn status_of(db_client: &DBClient, job_id: &str) -> JobStatus {
        db_client.get_inspection(job_id).await.unwrap().unwrap().status
    }

    #[test]
    fn policy_table() {
        use JobStatus::*;

        assert!(can_transition(UserRole::Admin, Scheduled, Inspected));
        assert!(can_transition(UserRole::Admin, Complete, Paid));
        assert!(!can_transition(UserRole::Admin, Scheduled, Approved));
        assert!(!can_transition(UserRole::Admin, Paid, Complete));

        assert!(can_transition(UserRole::Contractor, ReportSent, InProgress));
        assert!(can_transition(UserRole::Contractor, Assigned, InProgress));
        assert!(can_transition(UserRole::Contractor, InProgress, Complete));
        assert!(!can_transition(UserRole::Contractor, Scheduled, InProgress));
        assert!(!can_transition(UserRole::Contractor, Complete, Paid));

        for from in JobStatus::ALL {
            assert!(can_transition(UserRole::PropertyManager, from, from));
            for to in JobStatus::ALL {
                if from != to {
                    assert!(!can_transition(UserRole::PropertyManager, from, to));
                }
                if to < from {
                    assert!(!can_transition(UserRole::Admin, from, to));
                    assert!(!can_transition(UserRole::Contractor, from, to));
                }
            }
        }
    }

    #[test]
    fn policy_parses_from_config_values() {
        assert_eq!("Legacy".parse::<TransitionPolicy>(), Ok(TransitionPolicy::Legacy));
        assert_eq!(" hardened ".parse::<TransitionPolicy>(), Ok(TransitionPolicy::Hardened));
        assert!("strict".parse::<TransitionPolicy>().is_err());
    }

    #[tokio::test]
    async fn hardened_accept_moves_seeded_job_to_in_progress() {
        let (db_client, service, _, contractor, _) = setup(TransitionPolicy::Hardened).await;
        let before = db_client.get_inspection("1").await.unwrap().unwrap();

        let job = service.accept_job("1", &contractor).await.unwrap();

        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.contractor_id.as_deref(), Some(contractor.id.as_str()));
        assert_eq!(job.address, before.address);
        assert_eq!(job.repairs, before.repairs);
        assert_eq!(job.inspection_fee, before.inspection_fee);
    }

    #[tokio::test]
    async fn legacy_accept_moves_seeded_job_to_in_progress() {
        let (_, service, _, contractor, _) = setup(TransitionPolicy::Legacy).await;

        let job = service.accept_job("1", &contractor).await.unwrap();

        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.contractor_id, Some(contractor.id));
    }

    #[tokio::test]
    async fn legacy_accept_lets_any_role_take_a_job() {
        let (_, service, _, _, manager) = setup(TransitionPolicy::Legacy).await;

        let job = service.accept_job("1", &manager).await.unwrap();

        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.contractor_id, Some(manager.id));
    }

    #[tokio::test]
    async fn hardened_accept_rejects_non_contractors() {
        let (db_client, service, admin, _, manager) = setup(TransitionPolicy::Hardened).await;

        for actor in [&manager, &admin] {
            let err = service.accept_job("1", actor).await.unwrap_err();
            assert!(matches!(err, ServiceError::UnauthorizedJobAccess { .. }));
        }
        assert_eq!(status_of(&db_client, "1").await, JobStatus::ReportSent);
    }

    #[tokio::test]
    async fn hardened_accept_rejects_job_held_by_someone_else() {
        let (db_client, service, _, contractor, _) = setup(TransitionPolicy::Hardened).await;
        let rival = db_client
            .save_user(NewUser::new("ned", "ned@contractor.com", UserRole::Contractor))
            .await
            .unwrap();
        service.accept_job("1", &contractor).await.unwrap();

        let err = service.accept_job("1", &rival).await.unwrap_err();

        assert!(matches!(err, ServiceError::UnauthorizedJobAccess { .. }));
        let job = db_client.get_inspection("1").await.unwrap().unwrap();
        assert_eq!(job.contractor_id, Some(contractor.id));
    }

    #[tokio::test]
    async fn hardened_accept_rejects_jobs_not_yet_offered() {
        let (db_client, service, _, contractor, _) = setup(TransitionPolicy::Hardened).await;
        db_client
            .transact(|tx| -> Result<(), StoreError> {
                tx.inspection_mut("1")?.status = JobStatus::Scheduled;
                Ok(())
            })
            .await
            .unwrap();

        let err = service.accept_job("1", &contractor).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::IllegalTransition { from: JobStatus::Scheduled, to: JobStatus::InProgress, .. }
        ));
    }

    #[tokio::test]
    async fn unknown_job_is_not_found_under_both_policies() {
        for policy in [TransitionPolicy::Legacy, TransitionPolicy::Hardened] {
            let (_, service, admin, contractor, _) = setup(policy).await;

            let err = service.accept_job("404", &contractor).await.unwrap_err();
            assert_eq!(err, ServiceError::JobNotFound("404".to_string()));

            let err = service
                .update_job_status("404", JobStatus::Paid, &admin)
                .await
                .unwrap_err();
            assert_eq!(err, ServiceError::JobNotFound("404".to_string()));
        }
    }

    #[tokio::test]
    async fn legacy_update_overwrites_unconditionally() {
        let (db_client, service, _, _, manager) = setup(TransitionPolicy::Legacy).await;

        service.update_job_status("1", JobStatus::Scheduled, &manager).await.unwrap();
        assert_eq!(status_of(&db_client, "1").await, JobStatus::Scheduled);

        service.update_job_status("1", JobStatus::Paid, &manager).await.unwrap();
        assert_eq!(status_of(&db_client, "1").await, JobStatus::Paid);
    }

    #[tokio::test]
    async fn update_is_idempotent() {
        for policy in [TransitionPolicy::Legacy, TransitionPolicy::Hardened] {
            let (_, service, admin, _, _) = setup(policy).await;

            let once = service.update_job_status("1", JobStatus::Approved, &admin).await.unwrap();
            let twice = service.update_job_status("1", JobStatus::Approved, &admin).await.unwrap();

            assert_eq!(once, twice);
        }
    }

    #[tokio::test]
    async fn hardened_update_walks_forward_one_step_at_a_time() {
        let (db_client, service, admin, _, _) = setup(TransitionPolicy::Hardened).await;

        let err = service
            .update_job_status("1", JobStatus::Assigned, &admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::IllegalTransition { .. }));

        let err = service
            .update_job_status("1", JobStatus::Inspected, &admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::IllegalTransition { .. }));

        service.update_job_status("1", JobStatus::Approved, &admin).await.unwrap();
        assert_eq!(status_of(&db_client, "1").await, JobStatus::Approved);
    }

    #[tokio::test]
    async fn hardened_update_is_limited_to_admin_and_holder() {
        let (db_client, service, _, contractor, manager) = setup(TransitionPolicy::Hardened).await;

        let err = service
            .update_job_status("1", JobStatus::Approved, &manager)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnauthorizedJobAccess { .. }));

        let err = service
            .update_job_status("1", JobStatus::InProgress, &contractor)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnauthorizedJobAccess { .. }));

        assert_eq!(status_of(&db_client, "1").await, JobStatus::ReportSent);
    }

    #[tokio::test]
    async fn holder_completes_job_and_profile_is_credited() {
        let (db_client, service, admin, contractor, _) = setup(TransitionPolicy::Hardened).await;
        link_profile(&db_client, &contractor).await;
        service.accept_job("1", &contractor).await.unwrap();

        let done = service
            .update_job_status("1", JobStatus::Complete, &contractor)
            .await
            .unwrap();
        assert_eq!(done.status, JobStatus::Complete);
        assert!(done.completion_date.is_some());

        // re-applying Complete must not count the job twice
        service.update_job_status("1", JobStatus::Complete, &contractor).await.unwrap();
        let profile = db_client.get_contractor("c1").await.unwrap().unwrap();
        assert_eq!(profile.jobs_completed, 13);

        let err = service
            .update_job_status("1", JobStatus::Paid, &contractor)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::IllegalTransition { .. }));

        let paid = service.update_job_status("1", JobStatus::Paid, &admin).await.unwrap();
        assert_eq!(paid.status, JobStatus::Paid);
    }

    #[tokio::test]
    async fn assign_requires_contractor_user_and_approved_job() {
        let (db_client, service, admin, contractor, manager) = setup(TransitionPolicy::Hardened).await;

        let err = service.assign_job("1", &contractor.id, &admin).await.unwrap_err();
        assert!(matches!(err, ServiceError::IllegalTransition { .. }));

        service.update_job_status("1", JobStatus::Approved, &admin).await.unwrap();

        let err = service.assign_job("1", &manager.id, &admin).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = service.assign_job("1", "u-c-ghost", &admin).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound(_)));
        let err = service.assign_job("1", &contractor.id, &manager).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let job = service.assign_job("1", &contractor.id, &admin).await.unwrap();
        assert_eq!(job.status, JobStatus::Assigned);
        assert_eq!(job.contractor_id.as_deref(), Some(contractor.id.as_str()));

        let job = service
            .update_job_status("1", JobStatus::InProgress, &contractor)
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(status_of(&db_client, "1").await, JobStatus::InProgress);
    }

    #[tokio::test]
    async fn override_is_admin_only_and_may_move_backwards() {
        let (db_client, service, admin, contractor, _) = setup(TransitionPolicy::Hardened).await;

        let err = service
            .override_job_status("1", JobStatus::Scheduled, &contractor)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let job = service
            .override_job_status("1", JobStatus::Scheduled, &admin)
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Scheduled);
        assert_eq!(status_of(&db_client, "1").await, JobStatus::Scheduled);
    }

    #[tokio::test]
    async fn override_out_of_complete_takes_the_credit_back() {
        let (db_client, service, admin, contractor, _) = setup(TransitionPolicy::Hardened).await;
        link_profile(&db_client, &contractor).await;
        service.accept_job("1", &contractor).await.unwrap();
        service.update_job_status("1", JobStatus::Complete, &contractor).await.unwrap();
        assert_eq!(jobs_completed(&db_client).await, 13);

        let reopened = service
            .override_job_status("1", JobStatus::InProgress, &admin)
            .await
            .unwrap();
        assert_eq!(reopened.completion_date, None);
        assert_eq!(jobs_completed(&db_client).await, 12);

        service.update_job_status("1", JobStatus::Complete, &contractor).await.unwrap();
        assert_eq!(jobs_completed(&db_client).await, 13);
    }

    #[tokio::test]
    async fn override_into_paid_stamps_completion_once() {
        let (db_client, service, admin, contractor, _) = setup(TransitionPolicy::Hardened).await;
        link_profile(&db_client, &contractor).await;
        service.accept_job("1", &contractor).await.unwrap();
        service.override_job_status("1", JobStatus::Scheduled, &admin).await.unwrap();

        let paid = service.override_job_status("1", JobStatus::Paid, &admin).await.unwrap();
        assert!(paid.completion_date.is_some());
        assert_eq!(jobs_completed(&db_client).await, 13);

        // Paid and Complete are both finished; moving between them changes nothing
        let complete = service
            .override_job_status("1", JobStatus::Complete, &admin)
            .await
            .unwrap();
        assert_eq!(complete.completion_date, paid.completion_date);
        assert_eq!(jobs_completed(&db_client).await, 13);
    }

    #[tokio::test]
    async fn racing_accepts_leave_one_holder() {
        let (db_client, service, _, contractor, _) = setup(TransitionPolicy::Hardened).await;
        let rival = db_client
            .save_user(NewUser::new("ned", "ned@contractor.com", UserRole::Contractor))
            .await
            .unwrap();

        let (first, second) = tokio::join!(
            service.accept_job("1", &contractor),
            service.accept_job("1", &rival)
        );

        assert!(first.is_ok() != second.is_ok());
        let job = db_client.get_inspection("1").await.unwrap().unwrap();
        let winner = if first.is_ok() { &contractor.id } else { &rival.id };
        assert_eq!(job.contractor_id.as_ref(), Some(winner));
    }
}
