use crate::endpoint::{
    ABOUT, ACADEMIC_TERMS, CANTEEN, CONTACTS, COURSE, COURSE_EVALUATIONS, COURSE_GROUPS, DEGREE,
    DEGREES, SPACE, SPACES, SPACE_BLUEPRINT,
};
use crate::error::Result;
use crate::request::QueryParams;
use crate::transport::Transport;
use crate::FenixEduClient;
use serde_json::{Map, Value};

/// Endpoints that need no authorization.
pub struct PublicScope<'a, T: ?Sized> {
    client: &'a FenixEduClient<T>,
}

impl<'a, T: Transport + ?Sized> PublicScope<'a, T> {
    pub(crate) fn new(client: &'a FenixEduClient<T>) -> Self {
        Self { client }
    }

    /// General information about the institution.
    pub async fn about(&self) -> Result<Map<String, Value>> {
        self.client.invoke(&ABOUT, None, None, &[]).await?.into_object()
    }

    pub async fn academic_terms(&self) -> Result<Map<String, Value>> {
        self.client
            .invoke(&ACADEMIC_TERMS, None, None, &[])
            .await?
            .into_object()
    }

    /// This week's canteen menu.
    pub async fn canteen(&self) -> Result<Map<String, Value>> {
        self.client.invoke(&CANTEEN, None, None, &[]).await?.into_object()
    }

    pub async fn contacts(&self) -> Result<Map<String, Value>> {
        self.client.invoke(&CONTACTS, None, None, &[]).await?.into_object()
    }

    /// All degrees of `term`, or of the current term when `None`.
    pub async fn degrees(&self, term: Option<&str>) -> Result<Vec<Value>> {
        self.client
            .invoke(&DEGREES, None, academic_term(term), &[])
            .await?
            .into_array()
    }

    pub async fn degree(&self, id: &str, term: Option<&str>) -> Result<Map<String, Value>> {
        self.client
            .invoke(&DEGREE, None, academic_term(term), &[id])
            .await?
            .into_object()
    }

    pub async fn course(&self, id: &str) -> Result<Map<String, Value>> {
        self.client.invoke(&COURSE, None, None, &[id]).await?.into_object()
    }

    /// Student groups of a course, e.g. lab or project teams.
    pub async fn course_groups(&self, course_id: &str) -> Result<Vec<Value>> {
        self.client
            .invoke(&COURSE_GROUPS, None, None, &[course_id])
            .await?
            .into_array()
    }

    pub async fn course_evaluations(&self, course_id: &str) -> Result<Vec<Value>> {
        self.client
            .invoke(&COURSE_EVALUATIONS, None, None, &[course_id])
            .await?
            .into_array()
    }

    /// Top level spaces (campi).
    pub async fn spaces(&self) -> Result<Vec<Value>> {
        self.client.invoke(&SPACES, None, None, &[]).await?.into_array()
    }

    pub async fn space(&self, id: &str) -> Result<Map<String, Value>> {
        self.client.invoke(&SPACE, None, None, &[id]).await?.into_object()
    }

    /// The blueprint image of a space.
    pub async fn space_blueprint(&self, id: &str) -> Result<Vec<u8>> {
        self.client
            .invoke(&SPACE_BLUEPRINT, None, None, &[id])
            .await?
            .into_bytes()
    }
}

/// Query selecting `term`, shared by the endpoints that filter by academic term.
pub(crate) fn academic_term(term: Option<&str>) -> Option<QueryParams> {
    term.map(|term| QueryParams::from([("academicTerm".to_owned(), term.to_owned())]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn academic_term_is_only_sent_when_given() {
        assert_eq!(academic_term(None), None);
        let query = academic_term(Some("2023/2024")).unwrap();
        assert_eq!(query.len(), 1);
        assert_eq!(query.get("academicTerm").map(String::as_str), Some("2023/2024"));
    }
}
