//! Integration tests for the employee provisioning flow: number
//! allocation, manager resolution, partial updates, and team replacement.

mod test_utils;

use std::collections::HashSet;

use zenora::config::AllocatorConfig;
use zenora::provisioning::ProvisionRequest;
use zenora::provisioning::manager::resolve_manager;
use zenora::repositories::{EmployeeRepository, TeamRepository, UserRepository};

use test_utils::{provisioning, seed_department, seed_tenant, seed_user, setup_db, today_stamp};

#[tokio::test]
async fn test_first_provision_gets_number_one() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let dept = seed_department(&db, tenant.id, "Engineering").await;
    let user = seed_user(&db, tenant.id, "u1@t1.example", "employee", None).await;

    let outcome = provisioning(&db)
        .provision(
            tenant.id,
            ProvisionRequest {
                user_id: user.id,
                job_title: Some("Engineer".to_string()),
                department_id: Some(dept.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(outcome.created);
    assert_eq!(
        outcome.employee.employee_number,
        format!("EMP-{}-001", today_stamp())
    );
    assert_eq!(outcome.employee.manager_id, None);
    assert_eq!(outcome.employee.job_title, "Engineer");

    // The user gained the one-to-one link and the aligned department.
    let linked = UserRepository::new(&db)
        .find_by_tenant(tenant.id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(linked.employee_id, Some(outcome.employee.id));
    assert_eq!(linked.department_id, Some(dept.id));
}

#[tokio::test]
async fn test_second_provision_references_existing_manager() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let dept = seed_department(&db, tenant.id, "Engineering").await;
    let u1 = seed_user(&db, tenant.id, "u1@t1.example", "employee", None).await;
    let u2 = seed_user(&db, tenant.id, "u2@t1.example", "employee", None).await;

    let svc = provisioning(&db);

    let first = svc
        .provision(
            tenant.id,
            ProvisionRequest {
                user_id: u1.id,
                job_title: Some("Engineer".to_string()),
                department_id: Some(dept.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let second = svc
        .provision(
            tenant.id,
            ProvisionRequest {
                user_id: u2.id,
                job_title: Some("Engineer".to_string()),
                department_id: Some(dept.id),
                manager_user_id: Some(u1.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // U1 already had an employee record; it is reused, not duplicated, and
    // no number is skipped.
    assert_eq!(second.employee.manager_id, Some(first.employee.id));
    assert_eq!(
        second.employee.employee_number,
        format!("EMP-{}-002", today_stamp())
    );
}

#[tokio::test]
async fn test_manager_employee_created_on_demand() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let dept = seed_department(&db, tenant.id, "People").await;
    let manager_user = seed_user(&db, tenant.id, "boss@t1.example", "hr", None).await;
    let target = seed_user(&db, tenant.id, "emp@t1.example", "employee", None).await;

    let outcome = provisioning(&db)
        .provision(
            tenant.id,
            ProvisionRequest {
                user_id: target.id,
                job_title: Some("Recruiter".to_string()),
                department_id: Some(dept.id),
                manager_user_id: Some(manager_user.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // The manager's record is allocated first, the target second.
    let manager_employee = EmployeeRepository::new(&db)
        .find_by_user(tenant.id, manager_user.id)
        .await
        .unwrap()
        .expect("manager employee auto-created");
    assert_eq!(
        manager_employee.employee_number,
        format!("EMP-{}-001", today_stamp())
    );
    assert_eq!(
        outcome.employee.employee_number,
        format!("EMP-{}-002", today_stamp())
    );
    assert_eq!(outcome.employee.manager_id, Some(manager_employee.id));

    // Role-derived default title and department fallback.
    assert_eq!(manager_employee.job_title, "HR Manager");
    assert_eq!(manager_employee.department_id, dept.id);
}

#[tokio::test]
async fn test_manager_resolution_is_idempotent() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let dept = seed_department(&db, tenant.id, "Ops").await;
    let manager_user = seed_user(&db, tenant.id, "boss@t1.example", "admin", None).await;

    let config = AllocatorConfig::default();
    let first = resolve_manager(&db, tenant.id, manager_user.id, Some(dept.id), &config)
        .await
        .unwrap();
    let second = resolve_manager(&db, tenant.id, manager_user.id, Some(dept.id), &config)
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.employee_id, second.employee_id);

    let employee = EmployeeRepository::new(&db)
        .find_by_user(tenant.id, manager_user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(employee.id, first.employee_id);
    assert_eq!(employee.job_title, "Administrator");
}

#[tokio::test]
async fn test_cross_tenant_manager_rejected() {
    let db = setup_db().await;
    let tenant_a = seed_tenant(&db, "A").await;
    let tenant_b = seed_tenant(&db, "B").await;
    let dept = seed_department(&db, tenant_a.id, "Engineering").await;
    let foreign_manager = seed_user(&db, tenant_b.id, "boss@b.example", "manager", None).await;
    let target = seed_user(&db, tenant_a.id, "emp@a.example", "employee", None).await;

    let err = provisioning(&db)
        .provision(
            tenant_a.id,
            ProvisionRequest {
                user_id: target.id,
                job_title: Some("Engineer".to_string()),
                department_id: Some(dept.id),
                manager_user_id: Some(foreign_manager.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, Box::from("CROSS_TENANT"));

    // Nothing was persisted for the target.
    let employee = EmployeeRepository::new(&db)
        .find_by_user(tenant_a.id, target.id)
        .await
        .unwrap();
    assert!(employee.is_none());
}

#[tokio::test]
async fn test_manager_without_resolvable_department_rejected() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let manager_user = seed_user(&db, tenant.id, "boss@t1.example", "manager", None).await;

    let err = resolve_manager(
        &db,
        tenant.id,
        manager_user.id,
        None,
        &AllocatorConfig::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, Box::from("VALIDATION_FAILED"));
}

#[tokio::test]
async fn test_missing_manager_user_not_found() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;

    let err = resolve_manager(
        &db,
        tenant.id,
        uuid::Uuid::new_v4(),
        None,
        &AllocatorConfig::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, Box::from("NOT_FOUND"));
}

#[tokio::test]
async fn test_concurrent_provisioning_yields_distinct_numbers() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let dept = seed_department(&db, tenant.id, "Engineering").await;

    let mut users = Vec::new();
    for i in 0..20 {
        users.push(seed_user(&db, tenant.id, &format!("u{i}@t1.example"), "employee", None).await);
    }

    let svc = provisioning(&db);
    let mut handles = Vec::new();
    for user in users {
        let svc = svc.clone();
        let tenant_id = tenant.id;
        let dept_id = dept.id;
        handles.push(tokio::spawn(async move {
            svc.provision(
                tenant_id,
                ProvisionRequest {
                    user_id: user.id,
                    job_title: Some("Engineer".to_string()),
                    department_id: Some(dept_id),
                    ..Default::default()
                },
            )
            .await
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        numbers.insert(outcome.employee.employee_number);
    }

    // 20 concurrent calls, 20 distinct numbers covering 001..020.
    let stamp = today_stamp();
    let expected: HashSet<String> = (1..=20)
        .map(|seq| format!("EMP-{}-{:03}", stamp, seq))
        .collect();
    assert_eq!(numbers, expected);
}

#[tokio::test]
async fn test_update_keeps_employee_number() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let dept = seed_department(&db, tenant.id, "Engineering").await;
    let user = seed_user(&db, tenant.id, "u1@t1.example", "employee", None).await;

    let svc = provisioning(&db);
    let created = svc
        .provision(
            tenant.id,
            ProvisionRequest {
                user_id: user.id,
                job_title: Some("Engineer".to_string()),
                department_id: Some(dept.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = svc
        .provision(
            tenant.id,
            ProvisionRequest {
                user_id: user.id,
                job_title: Some("Staff Engineer".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(!updated.created);
    assert_eq!(updated.employee.id, created.employee.id);
    assert_eq!(
        updated.employee.employee_number,
        created.employee.employee_number
    );
    assert_eq!(updated.employee.job_title, "Staff Engineer");
}

#[tokio::test]
async fn test_create_requires_department_and_job_title() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let user = seed_user(&db, tenant.id, "u1@t1.example", "employee", None).await;

    let err = provisioning(&db)
        .provision(
            tenant.id,
            ProvisionRequest {
                user_id: user.id,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, Box::from("VALIDATION_FAILED"));
    let details = err.details.unwrap();
    assert!(details.get("job_title").is_some());
    assert!(details.get("department_id").is_some());
}

#[tokio::test]
async fn test_self_manager_rejected() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let dept = seed_department(&db, tenant.id, "Engineering").await;
    let user = seed_user(&db, tenant.id, "u1@t1.example", "employee", None).await;

    let err = provisioning(&db)
        .provision(
            tenant.id,
            ProvisionRequest {
                user_id: user.id,
                job_title: Some("Engineer".to_string()),
                department_id: Some(dept.id),
                manager_user_id: Some(user.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, Box::from("VALIDATION_FAILED"));
}

#[tokio::test]
async fn test_manager_cycle_rejected_on_update() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let dept = seed_department(&db, tenant.id, "Engineering").await;
    let top = seed_user(&db, tenant.id, "top@t1.example", "manager", None).await;
    let mid = seed_user(&db, tenant.id, "mid@t1.example", "employee", None).await;

    let svc = provisioning(&db);
    svc.provision(
        tenant.id,
        ProvisionRequest {
            user_id: top.id,
            job_title: Some("Director".to_string()),
            department_id: Some(dept.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    svc.provision(
        tenant.id,
        ProvisionRequest {
            user_id: mid.id,
            job_title: Some("Engineer".to_string()),
            department_id: Some(dept.id),
            manager_user_id: Some(top.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // top → mid would close the loop mid → top → mid.
    let err = svc
        .provision(
            tenant.id,
            ProvisionRequest {
                user_id: top.id,
                manager_user_id: Some(mid.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, Box::from("VALIDATION_FAILED"));
    assert!(err.message.contains("cycle"));
}

#[tokio::test]
async fn test_team_replacement_semantics() {
    let db = setup_db().await;
    let tenant = seed_tenant(&db, "T1").await;
    let dept = seed_department(&db, tenant.id, "Engineering").await;
    let user = seed_user(&db, tenant.id, "u1@t1.example", "employee", None).await;

    let teams = TeamRepository::new(&db);
    let team_x = teams.create(tenant.id, "X").await.unwrap();
    let team_y = teams.create(tenant.id, "Y").await.unwrap();
    let team_z = teams.create(tenant.id, "Z").await.unwrap();

    let svc = provisioning(&db);
    let created = svc
        .provision(
            tenant.id,
            ProvisionRequest {
                user_id: user.id,
                job_title: Some("Engineer".to_string()),
                department_id: Some(dept.id),
                team_ids: Some(vec![team_y.id, team_z.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let memberships: HashSet<_> = teams
        .list_membership_ids(created.employee.id)
        .await
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(memberships, HashSet::from([team_y.id, team_z.id]));

    // [X, Y] replaces [Y, Z]: Z removed, X added, Y retained.
    svc.provision(
        tenant.id,
        ProvisionRequest {
            user_id: user.id,
            team_ids: Some(vec![team_x.id, team_y.id]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let memberships: HashSet<_> = teams
        .list_membership_ids(created.employee.id)
        .await
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(memberships, HashSet::from([team_x.id, team_y.id]));

    // An empty list clears everything.
    svc.provision(
        tenant.id,
        ProvisionRequest {
            user_id: user.id,
            team_ids: Some(Vec::new()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let memberships = teams.list_membership_ids(created.employee.id).await.unwrap();
    assert!(memberships.is_empty());
}
