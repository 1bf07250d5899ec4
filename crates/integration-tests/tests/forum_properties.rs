use domains::{DomainError, Identifier, Role, IDENTIFIER_LEN};
use integration_tests::{caller, forum_with_thread, services_per_backend};

fn unknown_id() -> Identifier {
    Identifier::from_bytes([0xee; IDENTIFIER_LEN])
}

#[tokio::test]
async fn thread_with_unknown_forum_is_rejected() {
    for (backend, service) in services_per_backend().await.unwrap() {
        let err = service
            .create_thread("orphan".into(), "no parent".into(), unknown_id())
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::validation("forum does not exist"), "{backend}");
        assert!(service.get_threads().await.unwrap().is_empty(), "{backend}");
    }
}

#[tokio::test]
async fn message_without_ipfs_scheme_is_rejected() {
    for (backend, service) in services_per_backend().await.unwrap() {
        let (_, thread) = forum_with_thread(&service).await.unwrap();
        let author = caller("a1");
        service
            .create_message(&author, "first".into(), "ipfs://one".into(), thread)
            .await
            .unwrap();

        let err = service
            .create_message(&author, "second".into(), "http://x".into(), thread)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ValidationError(_)), "{backend}");
        let messages = service.get_thread_messages(&thread).await.unwrap();
        assert_eq!(messages.len(), 1, "{backend}");
        assert_eq!(messages[0].content, "first", "{backend}");
    }
}

#[tokio::test]
async fn message_with_unknown_thread_is_rejected() {
    for (backend, service) in services_per_backend().await.unwrap() {
        let err = service
            .create_message(&caller("a1"), "lost".into(), "ipfs://x".into(), unknown_id())
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::validation("thread does not exist"), "{backend}");
        assert!(service.get_messages().await.unwrap().is_empty(), "{backend}");
    }
}

#[tokio::test]
async fn first_registrant_is_admin() {
    for (backend, service) in services_per_backend().await.unwrap() {
        let first = service
            .register(&caller("02"), "second-key".into(), "ipfs://a".into())
            .await
            .unwrap();
        let second = service
            .register(&caller("01"), "first-key".into(), "ipfs://b".into())
            .await
            .unwrap();
        let third = service
            .register(&caller("03"), "third".into(), "ipfs://c".into())
            .await
            .unwrap();

        assert_eq!(first.role, Role::Admin, "{backend}");
        assert_eq!(second.role, Role::RegularUser, "{backend}");
        assert_eq!(third.role, Role::RegularUser, "{backend}");
    }
}

#[tokio::test]
async fn duplicate_registration_conflicts_and_keeps_profile() {
    for (backend, service) in services_per_backend().await.unwrap() {
        let me = caller("beef");
        let original = service
            .register(&me, "ana".into(), "ipfs://ana".into())
            .await
            .unwrap();

        let err = service
            .register(&me, "impostor".into(), "ipfs://evil".into())
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::conflict("User already exists"), "{backend}");
        assert_eq!(service.get_user(&me).await.unwrap(), original, "{backend}");
        assert_eq!(service.get_users().await.unwrap().len(), 1, "{backend}");
    }
}

#[tokio::test]
async fn thread_messages_keep_posting_order() {
    for (backend, service) in services_per_backend().await.unwrap() {
        let (_, thread) = forum_with_thread(&service).await.unwrap();
        let mut posted = Vec::new();
        for (who, text) in [("0a", "m1"), ("0b", "m2"), ("0a", "m3")] {
            let id = service
                .create_message(&caller(who), text.into(), format!("ipfs://{text}"), thread)
                .await
                .unwrap();
            posted.push(id);
        }

        let messages = service.get_thread_messages(&thread).await.unwrap();
        let ids: Vec<_> = messages.iter().map(|m| m.id).collect();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(ids, posted, "{backend}");
        assert_eq!(contents, ["m1", "m2", "m3"], "{backend}");
        assert_eq!(messages[1].user_id, caller("0b"), "{backend}");
        assert!(messages.iter().all(|m| m.thread_id == thread), "{backend}");
    }
}

#[tokio::test]
async fn forums_round_trip() {
    for (backend, service) in services_per_backend().await.unwrap() {
        let f1 = service.create_forum("F1".into(), "one".into()).await.unwrap();
        let f2 = service.create_forum("F2".into(), "two".into()).await.unwrap();

        let forums = service.get_forums().await.unwrap();
        assert_eq!(forums.len(), 2, "{backend}");
        for (key, forum) in &forums {
            assert_eq!(*key, forum.id, "{backend}");
        }

        let one = service.get_forum(&f1).await.unwrap();
        let two = service.get_forum(&f2).await.unwrap();
        assert_eq!((one.name.as_str(), one.description.as_str()), ("F1", "one"), "{backend}");
        assert_eq!((two.name.as_str(), two.description.as_str()), ("F2", "two"), "{backend}");
    }
}

#[tokio::test]
async fn change_avatar_touches_only_avatar() {
    for (backend, service) in services_per_backend().await.unwrap() {
        let stranger = caller("dead");
        let err = service
            .change_avatar(&stranger, "ipfs://new".into())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)), "{backend}");
        assert!(service.get_users().await.unwrap().is_empty(), "{backend}");

        let me = caller("beef");
        let before = service
            .register(&me, "ana".into(), "ipfs://old".into())
            .await
            .unwrap();
        let after = service.change_avatar(&me, "ipfs://new".into()).await.unwrap();

        assert_eq!(after.avatar, "ipfs://new", "{backend}");
        assert_eq!(
            (&after.id, &after.name, after.role),
            (&before.id, &before.name, before.role),
            "{backend}"
        );
        assert_eq!(service.get_user(&me).await.unwrap(), after, "{backend}");
    }
}

#[tokio::test]
async fn lookups_of_absent_entities_report_not_found() {
    for (backend, service) in services_per_backend().await.unwrap() {
        let (_, thread) = forum_with_thread(&service).await.unwrap();

        let missing_thread = service.get_thread(&unknown_id()).await;
        assert!(matches!(missing_thread, Err(DomainError::NotFound(_))), "{backend}");
        let missing_user = service.get_user(&caller("00")).await;
        assert!(matches!(missing_user, Err(DomainError::NotFound(_))), "{backend}");
        // an existing but silent thread is indistinguishable from a missing one
        let silent = service.get_thread_messages(&thread).await;
        assert!(matches!(silent, Err(DomainError::NotFound(_))), "{backend}");
        let unknown = service.get_thread_messages(&unknown_id()).await;
        assert!(matches!(unknown, Err(DomainError::NotFound(_))), "{backend}");
    }
}

#[tokio::test]
async fn thread_records_its_forum() {
    for (backend, service) in services_per_backend().await.unwrap() {
        let (forum, thread) = forum_with_thread(&service).await.unwrap();

        let stored = service.get_thread(&thread).await.unwrap();
        assert_eq!(stored.forum_id, forum, "{backend}");
        assert_eq!(stored.name, "intro", "{backend}");
        assert_eq!(service.get_threads().await.unwrap(), vec![(thread, stored)], "{backend}");
    }
}
