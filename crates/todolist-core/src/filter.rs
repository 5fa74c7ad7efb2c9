use chrono::NaiveDate;

/// Search criteria for narrowing a task listing.
///
/// Every field is optional and the present ones are combined conjunctively.
/// Absent fields simply do not constrain the result; there is no error case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Substring match on the task name.
    pub name: Option<String>,
    /// Inclusive lower bound on the due date. Tasks without a due date
    /// never match a date-bounded filter.
    pub due_from: Option<NaiveDate>,
    /// Inclusive upper bound on the due date.
    pub due_until: Option<NaiveDate>,
    /// Keep only completed (`true`) or only open (`false`) tasks.
    pub ended: Option<bool>,
    /// Keep only tasks on lists this user is a member of.
    pub member: Option<i64>,
}

impl TaskFilter {
    /// True when no criterion is set, i.e. the filter matches everything.
    pub fn is_unconstrained(&self) -> bool {
        self.name.is_none()
            && self.due_from.is_none()
            && self.due_until.is_none()
            && self.ended.is_none()
            && self.member.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_unconstrained() {
        assert!(TaskFilter::default().is_unconstrained());
    }

    #[test]
    fn test_any_criterion_constrains() {
        let filter = TaskFilter {
            ended: Some(false),
            ..TaskFilter::default()
        };
        assert!(!filter.is_unconstrained());

        let filter = TaskFilter {
            member: Some(42),
            ..TaskFilter::default()
        };
        assert!(!filter.is_unconstrained());
    }
}
