use crate::endpoint::{
    PERSON, PERSON_COURSES, PERSON_CURRICULUM, PERSON_EVALUATIONS, PERSON_PAYMENTS,
};
use crate::error::Result;
use crate::oauth::Authorization;
use crate::transport::Transport;
use crate::public::academic_term;
use crate::FenixEduClient;
use serde_json::{Map, Value};

impl<T: Transport + ?Sized> FenixEduClient<T> {
    /// The person the authorization belongs to.
    pub async fn person(&self, authorization: &Authorization) -> Result<Map<String, Value>> {
        self.invoke(&PERSON, Some(authorization), None, &[])
            .await?
            .into_object()
    }

    pub async fn person_curriculum(&self, authorization: &Authorization) -> Result<Vec<Value>> {
        self.invoke(&PERSON_CURRICULUM, Some(authorization), None, &[])
            .await?
            .into_array()
    }

    /// Courses the person attends or teaches in `term`, the current one when `None`.
    pub async fn person_courses(
        &self,
        authorization: &Authorization,
        term: Option<&str>,
    ) -> Result<Map<String, Value>> {
        self.invoke(&PERSON_COURSES, Some(authorization), academic_term(term), &[])
            .await?
            .into_object()
    }

    pub async fn person_evaluations(&self, authorization: &Authorization) -> Result<Vec<Value>> {
        self.invoke(&PERSON_EVALUATIONS, Some(authorization), None, &[])
            .await?
            .into_array()
    }

    pub async fn person_payments(&self, authorization: &Authorization) -> Result<Map<String, Value>> {
        self.invoke(&PERSON_PAYMENTS, Some(authorization), None, &[])
            .await?
            .into_object()
    }
}
