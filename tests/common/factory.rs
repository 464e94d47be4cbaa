use uuid::Uuid;

use collection_service::models::{Collection, NewCollection, OwnerSummary};
use collection_service::repositories::CollectionStore;
use collection_service::services::Identity;

use super::TestApp;

/// Authentication info for tests
pub struct TestAuth {
    pub user_id: String,
    pub email: String,
    pub student_code: String,
    pub token: String,
}

impl TestAuth {
    /// Get the Authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Factory for creating test data
pub struct Factory<'a> {
    app: &'a TestApp,
}

impl<'a> Factory<'a> {
    pub fn new(app: &'a TestApp) -> Self {
        Self { app }
    }

    /// Create a test user: a valid token plus an account row for the owner join
    pub async fn create_user(&self) -> TestAuth {
        let user_id = Uuid::new_v4().to_string();
        let student_code = format!("520H{}", &user_id[..4]);
        let email = format!("{}@student.example.edu", student_code);
        let token = format!("token-{}", Uuid::new_v4());

        self.app
            .identity
            .register(
                token.clone(),
                Identity {
                    id: user_id.clone(),
                    email: Some(email.clone()),
                },
            )
            .await;

        self.app
            .store
            .add_account(OwnerSummary {
                id: user_id.clone(),
                student_code: Some(student_code.clone()),
                email: Some(email.clone()),
            })
            .await;

        TestAuth {
            user_id,
            email,
            student_code,
            token,
        }
    }

    /// Insert a collection directly into the store
    pub async fn create_collection(
        &self,
        owner: &TestAuth,
        name: &str,
        is_public: bool,
        tags: &[&str],
    ) -> Collection {
        let input = NewCollection {
            owner_id: owner.user_id.clone(),
            name: name.to_string(),
            description: Some(format!("Description of {}", name)),
            is_public,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            refs: vec![],
        };

        self.app
            .store
            .insert(Some(owner.token.as_str()), &input)
            .await
            .unwrap()
    }
}
