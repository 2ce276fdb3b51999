use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr, TransactionTrait, sea_query::Expr,
};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::NewMovie,
    ranking::RankChange,
};

/// The movie collection table. Cloning is cheap; every call checks a
/// connection out of the pool and hands it back when the call returns.
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn close(self) -> AppResult<()> {
        self.db.close().await?;
        Ok(())
    }

    pub async fn get(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn get_by_title(&self, title: &str) -> AppResult<Option<movie::Model>> {
        let found = movie::Entity::find()
            .filter(movie::Column::Title.eq(title))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    /// Ascending by rating. Unrated movies sort first, ties keep insertion order.
    pub async fn list_by_rating(&self) -> AppResult<Vec<movie::Model>> {
        let movies = movie::Entity::find()
            .order_by_asc(movie::Column::Rating)
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;
        Ok(movies)
    }

    pub async fn insert(&self, new: NewMovie) -> AppResult<movie::Model> {
        let title = new.title.clone();
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(new.title),
            year: Set(new.year),
            description: Set(new.description),
            rating: Set(None),
            ranking: Set(None),
            review: Set(None),
            img_url: Set(new.img_url),
        };

        match model.insert(&self.db).await {
            Ok(movie) => Ok(movie),
            Err(err) if is_unique_violation(&err) => Err(AppError::DuplicateTitle(title)),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes every column of `movie` back to its row.
    pub async fn update(&self, movie: movie::Model) -> AppResult<movie::Model> {
        let id = movie.id;
        let title = movie.title.clone();
        let active = movie::ActiveModel::from(movie).reset_all();

        match active.update(&self.db).await {
            Ok(movie) => Ok(movie),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound(format!("movie {id}"))),
            Err(err) if is_unique_violation(&err) => Err(AppError::DuplicateTitle(title)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("movie {id}")));
        }
        Ok(())
    }

    pub async fn save_rankings(&self, changes: &[RankChange]) -> AppResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        for change in changes {
            movie::Entity::update_many()
                .col_expr(movie::Column::Ranking, Expr::value(change.ranking))
                .filter(movie::Column::Id.eq(change.id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        Ok(())
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::db;

    async fn test_store() -> (MovieStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("movies.db").display());
        let conn = db::connect_and_migrate(&url).await.unwrap();
        (MovieStore::new(conn), dir)
    }

    fn new_movie(title: &str) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            year: Some(2002),
            description: "A publicist is pinned down in a phone booth.".to_string(),
            img_url: Some("https://image.tmdb.org/t/p/w500/tjrX2oWRCM3Tvarz38zlZM7Uc10.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn insert_starts_unrated() {
        let (store, _dir) = test_store().await;
        let movie = store.insert(new_movie("Phone Booth")).await.unwrap();

        assert_eq!(movie.rating, None);
        assert_eq!(movie.review, None);
        assert_eq!(movie.ranking, None);
        assert_eq!(store.get(movie.id).await.unwrap(), Some(movie.clone()));
        assert_eq!(store.get_by_title("Phone Booth").await.unwrap(), Some(movie));
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() {
        let (store, _dir) = test_store().await;
        store.insert(new_movie("Phone Booth")).await.unwrap();

        let err = store.insert(new_movie("Phone Booth")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateTitle(ref t) if t == "Phone Booth"));
        assert_eq!(store.list_by_rating().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_persists_rating_and_review() {
        let (store, _dir) = test_store().await;
        let mut movie = store.insert(new_movie("Phone Booth")).await.unwrap();
        movie.rating = Some(7.3);
        movie.review = Some("My favourite character was the caller.".to_string());
        store.update(movie.clone()).await.unwrap();

        let stored = store.get(movie.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, Some(7.3));
        assert_eq!(stored.review.as_deref(), Some("My favourite character was the caller."));
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let (store, _dir) = test_store().await;
        let mut movie = store.insert(new_movie("Phone Booth")).await.unwrap();
        store.delete(movie.id).await.unwrap();
        movie.rating = Some(1.0);

        assert!(matches!(store.update(movie).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_then_get_is_absent() {
        let (store, _dir) = test_store().await;
        let movie = store.insert(new_movie("Phone Booth")).await.unwrap();

        store.delete(movie.id).await.unwrap();
        assert_eq!(store.get(movie.id).await.unwrap(), None);
        assert!(matches!(store.delete(movie.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn listing_is_ascending_with_unrated_first() {
        let (store, _dir) = test_store().await;
        for (title, rating) in [("High", Some(9.1)), ("Unrated", None), ("Low", Some(2.5))] {
            let mut movie = store.insert(new_movie(title)).await.unwrap();
            movie.rating = rating;
            store.update(movie).await.unwrap();
        }

        let titles: Vec<String> =
            store.list_by_rating().await.unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, ["Unrated", "Low", "High"]);
    }

    #[tokio::test]
    async fn save_rankings_writes_only_given_rows() {
        let (store, _dir) = test_store().await;
        let a = store.insert(new_movie("A")).await.unwrap();
        let b = store.insert(new_movie("B")).await.unwrap();

        store.save_rankings(&[RankChange { id: b.id, ranking: 4 }]).await.unwrap();

        assert_eq!(store.get(a.id).await.unwrap().unwrap().ranking, None);
        assert_eq!(store.get(b.id).await.unwrap().unwrap().ranking, Some(4));
    }
}
