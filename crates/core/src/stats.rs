//! Dashboard counters over both collections.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use coursedesk_filter::{FieldPath, Filter};
use serde::Serialize;
use serde_json::Value;

use crate::course::CourseCard;
use crate::document::id::ObjectId;
use crate::document::status::PublicationStatus;
use crate::document::validate::CollectionSpec;
use crate::error::CoreResult;
use crate::page::Page;
use crate::store::DocumentStore;

const RECENT_COURSES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub courses: CourseCounts,
    pub pages: PageCounts,
    pub courses_by_category: Vec<CategoryCount>,
    pub recent_courses: Vec<RecentCourse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourseCounts {
    pub total: u64,
    pub published: u64,
    pub draft: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageCounts {
    pub total: u64,
    pub published: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    #[serde(rename = "_id")]
    pub category: Value,
    pub count: u64,
}

/// Projection of a course for the dashboard's recent list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCourse {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub program_title: Value,
    pub category: Value,
    pub created_at: DateTime<Utc>,
    pub meta: RecentMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentMeta {
    pub status: Value,
}

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn DocumentStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn dashboard(&self) -> CoreResult<DashboardStats> {
        let courses = CollectionSpec::of::<CourseCard>();
        let pages = CollectionSpec::of::<Page>();
        let published = PublicationStatus::Published.as_str();
        let draft = PublicationStatus::Draft.as_str();

        let course_counts = CourseCounts {
            total: self.store.count(&courses, &Filter::Everything).await?,
            published: self
                .store
                .count(&courses, &Filter::eq("meta.status", published))
                .await?,
            draft: self
                .store
                .count(&courses, &Filter::eq("meta.status", draft))
                .await?,
        };
        let page_counts = PageCounts {
            total: self.store.count(&pages, &Filter::Everything).await?,
            published: self
                .store
                .count(&pages, &Filter::eq("status", published))
                .await?,
        };

        let courses_by_category = self
            .store
            .count_by(&courses, &FieldPath::parse("category"))
            .await?
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();

        let recent_courses = self
            .store
            .find(&courses, &Filter::Everything, Some(RECENT_COURSES))
            .await?
            .into_iter()
            .map(|doc| {
                let field = |name: &str| doc.body.get(name).cloned().unwrap_or(Value::Null);
                RecentCourse {
                    id: doc.id,
                    program_title: field("programTitle"),
                    category: field("category"),
                    created_at: doc.created_at,
                    meta: RecentMeta {
                        status: FieldPath::parse("meta.status")
                            .resolve_in(&doc.body)
                            .cloned()
                            .unwrap_or(Value::Null),
                    },
                }
            })
            .collect();

        Ok(DashboardStats {
            courses: course_counts,
            pages: page_counts,
            courses_by_category,
            recent_courses,
        })
    }
}
