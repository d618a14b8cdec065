use crate::agent::Answer;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: Answer,
}

/// In-memory log of the turns in one session. Entries are kept in the order
/// they were appended; display order is up to the caller.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Outcome;

    fn entry(question: &str) -> HistoryEntry {
        HistoryEntry {
            question: question.to_string(),
            answer: Answer {
                text: format!("answer to {}", question),
                sources: Vec::new(),
                outcome: Outcome::Answered,
            },
        }
    }

    #[test]
    fn reads_back_in_append_order() {
        let mut history = SessionHistory::new();
        assert!(history.all().is_empty());

        for q in ["one", "two", "three", "four"] {
            history.append(entry(q));
        }

        let questions: Vec<&str> = history.all().iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, ["one", "two", "three", "four"]);
        assert_eq!(history.all().len(), 4);
    }

    #[test]
    fn reading_does_not_reorder_storage() {
        let mut history = SessionHistory::new();
        history.append(entry("a"));
        history.append(entry("b"));

        let newest_first: Vec<_> = history
            .all()
            .iter()
            .rev()
            .map(|e| e.question.as_str())
            .collect();
        assert_eq!(newest_first, ["b", "a"]);
        assert_eq!(history.all()[0].question, "a");
    }
}
