//! Document search criteria and paging

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Channel, Document, DocumentStatus, DocumentType};
use crate::domain::DomainError;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: usize = 100;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Field used to order search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    UploadDate,
    Filename,
    DocumentType,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Filters, ordering and paging for a document search
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSearchCriteria {
    pub uploaded_from: Option<DateTime<Utc>>,
    pub uploaded_to: Option<DateTime<Utc>>,
    /// Substring match on the filename
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub document_type: Option<DocumentType>,
    pub status: Option<DocumentStatus>,
    pub customer_id: Option<String>,
    pub channel: Option<Channel>,
    pub sort_by: SortField,
    pub sort_direction: SortDirection,
    /// 1-based page number
    pub page_number: usize,
    pub page_size: usize,
}

impl Default for DocumentSearchCriteria {
    fn default() -> Self {
        Self {
            uploaded_from: None,
            uploaded_to: None,
            filename: None,
            content_type: None,
            document_type: None,
            status: None,
            customer_id: None,
            channel: None,
            sort_by: SortField::default(),
            sort_direction: SortDirection::default(),
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DocumentSearchCriteria {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.page_number < 1 {
            return Err(DomainError::validation("page_number must be greater than 0"));
        }

        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(DomainError::validation(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        if (self.page_number - 1).checked_mul(self.page_size).is_none() {
            return Err(DomainError::validation(format!(
                "page_number {} is out of range for page_size {}",
                self.page_number, self.page_size
            )));
        }

        Ok(())
    }

    /// Number of matching items to skip before the requested page
    pub fn skip(&self) -> usize {
        self.page_number.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Whether a document passes every filter in these criteria
    pub fn matches(&self, document: &Document) -> bool {
        if let Some(from) = self.uploaded_from {
            if document.uploaded_at() < from {
                return false;
            }
        }

        if let Some(to) = self.uploaded_to {
            if document.uploaded_at() > to {
                return false;
            }
        }

        if let Some(filename) = non_blank(&self.filename) {
            if !document.filename().contains(filename) {
                return false;
            }
        }

        if let Some(content_type) = non_blank(&self.content_type) {
            if document.content_type() != content_type {
                return false;
            }
        }

        if let Some(customer_id) = non_blank(&self.customer_id) {
            if document.customer_id() != Some(customer_id) {
                return false;
            }
        }

        self.document_type.is_none_or(|t| document.document_type() == t)
            && self.status.is_none_or(|s| document.status() == s)
            && self.channel.is_none_or(|c| document.channel() == c)
    }

    /// Ordering between two documents for the configured sort
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ordering = match self.sort_by {
            SortField::UploadDate => a.uploaded_at().cmp(&b.uploaded_at()),
            SortField::Filename => a.filename().cmp(b.filename()),
            SortField::DocumentType => a.document_type().cmp(&b.document_type()),
            SortField::Status => a.status().cmp(&b.status()),
        };

        match self.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// One page of results plus the total match count
#[derive(Debug, Clone, PartialEq)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub page_number: usize,
    pub page_size: usize,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: usize, page_number: usize, page_size: usize) -> Self {
        Self {
            items,
            total_count,
            page_number,
            page_size,
        }
    }

    pub fn empty(page_number: usize, page_size: usize) -> Self {
        Self::new(Vec::new(), 0, page_number, page_size)
    }

    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::entity::test_support::new_document;

    #[test]
    fn test_default_criteria_is_valid() {
        let criteria = DocumentSearchCriteria::default();
        assert!(criteria.validate().is_ok());
        assert_eq!(criteria.skip(), 0);
    }

    #[test]
    fn test_validate_rejects_bad_paging() {
        let zero_page = DocumentSearchCriteria {
            page_number: 0,
            ..Default::default()
        };
        assert!(zero_page.validate().is_err());

        let oversized = DocumentSearchCriteria {
            page_size: MAX_PAGE_SIZE + 1,
            ..Default::default()
        };
        assert!(oversized.validate().is_err());

        let empty_page = DocumentSearchCriteria {
            page_size: 0,
            ..Default::default()
        };
        assert!(empty_page.validate().is_err());
    }

    #[test]
    fn test_skip() {
        let criteria = DocumentSearchCriteria {
            page_number: 3,
            page_size: 20,
            ..Default::default()
        };
        assert_eq!(criteria.skip(), 40);
    }

    #[test]
    fn test_huge_page_number_is_rejected_without_overflow() {
        let criteria = DocumentSearchCriteria {
            page_number: usize::MAX,
            page_size: MAX_PAGE_SIZE,
            ..Default::default()
        };

        assert!(matches!(
            criteria.validate(),
            Err(DomainError::Validation { .. })
        ));
        assert_eq!(criteria.skip(), usize::MAX);

        let last_single_item_page = DocumentSearchCriteria {
            page_number: usize::MAX,
            page_size: 1,
            ..Default::default()
        };
        assert!(last_single_item_page.validate().is_ok());
    }

    #[test]
    fn test_matches_filters() {
        let doc = Document::received(new_document(b"abc"));

        let by_name = DocumentSearchCriteria {
            filename: Some("state".to_string()),
            ..Default::default()
        };
        assert!(by_name.matches(&doc));

        let blank_name = DocumentSearchCriteria {
            filename: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank_name.matches(&doc));

        let wrong_status = DocumentSearchCriteria {
            status: Some(DocumentStatus::Sent),
            ..Default::default()
        };
        assert!(!wrong_status.matches(&doc));

        let wrong_customer = DocumentSearchCriteria {
            customer_id: Some("cust-999".to_string()),
            ..Default::default()
        };
        assert!(!wrong_customer.matches(&doc));

        let future_window = DocumentSearchCriteria {
            uploaded_from: Some(Utc::now() + chrono::Duration::hours(1)),
            ..Default::default()
        };
        assert!(!future_window.matches(&doc));
    }

    #[test]
    fn test_compare_descending_filename() {
        let mut a = new_document(b"a");
        a.filename = "a.pdf".to_string();
        let mut b = new_document(b"b");
        b.filename = "b.pdf".to_string();
        let (a, b) = (Document::received(a), Document::received(b));

        let criteria = DocumentSearchCriteria {
            sort_by: SortField::Filename,
            sort_direction: SortDirection::Desc,
            ..Default::default()
        };

        assert_eq!(criteria.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_paged_result_navigation() {
        let page: PagedResult<u32> = PagedResult::new(vec![1, 2, 3], 25, 2, 10);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_previous_page());
        assert!(page.has_next_page());

        let last: PagedResult<u32> = PagedResult::new(vec![1], 21, 3, 10);
        assert!(!last.has_next_page());

        let empty: PagedResult<u32> = PagedResult::empty(1, 10);
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_previous_page());
        assert!(!empty.has_next_page());
    }
}
