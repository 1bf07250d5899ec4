use std::sync::Arc;

use domains::Role;
use integration_tests::{caller, forum_with_thread};
use services::ForumService;
use storage_adapters::SqliteStore;

#[tokio::test]
async fn forum_graph_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("forum.db").display());
    let admin = caller("0100");

    let (forum, thread) = {
        let service = ForumService::new(Arc::new(SqliteStore::new(&url).await.unwrap()));
        service
            .register(&admin, "root".into(), "ipfs://root".into())
            .await
            .unwrap();
        let ids = forum_with_thread(&service).await.unwrap();
        service
            .create_message(&admin, "welcome".into(), "ipfs://banner".into(), ids.1)
            .await
            .unwrap();
        ids
    };

    let service = ForumService::new(Arc::new(SqliteStore::new(&url).await.unwrap()));

    assert_eq!(service.get_forum(&forum).await.unwrap().name, "general");
    assert_eq!(service.get_thread(&thread).await.unwrap().forum_id, forum);
    let messages = service.get_thread_messages(&thread).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].user_id, admin);

    // the admin slot is already taken after restart
    let late = service
        .register(&caller("0200"), "late".into(), "ipfs://late".into())
        .await
        .unwrap();
    assert_eq!(late.role, Role::RegularUser);
    assert_eq!(service.get_user(&admin).await.unwrap().role, Role::Admin);
}
