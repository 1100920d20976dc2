use chrono::Duration;
use testcontainers::clients;
use crate::domain::{BackgroundId, Dimension, Intervals, NewAquarium};
use crate::repo::{PgStorage, Storage};
use crate::repo::test::{create_users, start_postgres, time, uid};

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn create_and_maintain() {
    let docker = clients::Cli::default();
    let (_container, db) = start_postgres(&docker).await;
    let storage = PgStorage::new(db);
    create_users(&storage).await;

    let mut tx = storage.begin().await.unwrap();
    let new_aquarium = NewAquarium::backdated(uid(), "Reef".to_owned(), BackgroundId::new(2), &Intervals::default(), time());
    let aquarium = tx.create_aquarium(new_aquarium).await.expect("couldn't create an aquarium");
    assert_eq!(aquarium.last_fed_at, Some(time() - Duration::minutes(60)));
    assert_eq!(tx.get_aquarium(aquarium.id).await.unwrap(), Some(aquarium.clone()));

    assert!(tx.touch_aquarium(aquarium.id, Dimension::Feed, time()).await.unwrap());
    assert!(tx.touch_aquarium(aquarium.id, Dimension::Feed, time() - Duration::hours(1)).await.unwrap());
    assert!(tx.rename_aquarium(aquarium.id, "Lagoon").await.unwrap());
    assert!(tx.set_background(aquarium.id, BackgroundId::new(5)).await.unwrap());
    tx.commit().await.unwrap();

    let mut tx = storage.begin().await.unwrap();
    let updated = tx.get_aquarium(aquarium.id).await.unwrap().expect("the aquarium is absent");
    assert_eq!(updated.last_fed_at, Some(time()));
    assert_eq!(updated.last_water_changed_at, aquarium.last_water_changed_at);
    assert_eq!(updated.name, "Lagoon");
    assert_eq!(updated.background, BackgroundId::new(5));
    assert_eq!(tx.find_aquariums_by_owner(&uid()).await.unwrap(), vec![updated.clone()]);
    assert_eq!(tx.all_aquariums().await.unwrap().len(), 1);

    assert!(tx.delete_aquarium(aquarium.id).await.unwrap());
    assert!(!tx.delete_aquarium(aquarium.id).await.unwrap());
    assert!(!tx.touch_aquarium(aquarium.id, Dimension::Clean, time()).await.unwrap());
}
