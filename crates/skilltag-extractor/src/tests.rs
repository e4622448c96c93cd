//! Scenario tests for the SkillExtractor

#[cfg(test)]
mod tests {
    use crate::{
        EmbeddingIndex, ExtractionEvent, ExtractionRequest, ExtractorConfig, ExtractorError,
        MatchError, SkillExtractor, SkillTaxonomy, SkipReason,
    };
    use skilltag_domain::traits::{PaperCatalog, PaperCorpus, SkillSink};
    use skilltag_domain::{
        CorpusFilter, CorpusItem, ExtractedSkill, ExtractionId, Paper, PaperId,
    };
    use skilltag_embed::{EmbeddingError, EmbeddingModel, HashingEmbeddingModel};
    use skilltag_store::SqliteStore;

    const PYTHON_RUST_ABSTRACT: &str = "We use Python and Rust for data analysis";

    fn index(labels: &[&str]) -> EmbeddingIndex<HashingEmbeddingModel> {
        let taxonomy = SkillTaxonomy::from_labels(labels.iter().copied()).unwrap();
        EmbeddingIndex::build(taxonomy, HashingEmbeddingModel::default()).unwrap()
    }

    fn config(top_k: usize) -> ExtractorConfig {
        ExtractorConfig {
            top_k,
            page_size: 2,
            ..ExtractorConfig::offline()
        }
    }

    fn add_paper(
        store: &mut SqliteStore,
        doi: &str,
        year: Option<i32>,
        authors: &[&str],
        abstract_text: Option<&str>,
    ) -> PaperId {
        let mut paper = Paper::new(format!("Paper {}", doi), doi);
        paper.year = year;
        paper.authors = authors.iter().map(|a| a.to_string()).collect();
        paper.abstract_text = abstract_text.map(str::to_string);
        store.insert_paper(&paper).unwrap()
    }

    fn count_rows(store: &SqliteStore, ids: &[PaperId]) -> usize {
        ids.iter()
            .map(|id| store.skills_for_paper(*id, None).unwrap().len())
            .sum()
    }

    /// In-memory corpus and sink with failure injection
    #[derive(Default)]
    struct MemoryStore {
        items: Vec<CorpusItem>,
        results: Vec<ExtractedSkill>,
        fail_record_for: Option<PaperId>,
        fail_reads: bool,
    }

    impl MemoryStore {
        fn with_abstracts(abstracts: &[Option<&str>]) -> Self {
            let items = abstracts
                .iter()
                .enumerate()
                .map(|(i, text)| CorpusItem {
                    id: PaperId::new(i as i64 + 1),
                    abstract_text: text.map(str::to_string),
                    authors: vec!["Alice Wong".to_string()],
                    year: Some(2020),
                })
                .collect();
            Self {
                items,
                ..Default::default()
            }
        }
    }

    impl PaperCorpus for MemoryStore {
        type Error = String;

        fn find_page(
            &self,
            filter: &CorpusFilter,
            after: Option<PaperId>,
            limit: usize,
        ) -> Result<Vec<CorpusItem>, Self::Error> {
            if self.fail_reads {
                return Err("disk on fire".to_string());
            }
            // Deliberately returns blank abstracts too
            Ok(self
                .items
                .iter()
                .filter(|i| after.is_none_or(|a| i.id > a))
                .filter(|i| filter.matches(i))
                .take(limit)
                .cloned()
                .collect())
        }

        fn count(&self, filter: &CorpusFilter) -> Result<usize, Self::Error> {
            Ok(self.items.iter().filter(|i| filter.matches(i)).count())
        }
    }

    impl SkillSink for MemoryStore {
        type Error = String;

        fn has_results(&self, paper: PaperId, model: &str) -> Result<bool, Self::Error> {
            Ok(self
                .results
                .iter()
                .any(|r| r.paper_id == paper && r.embedding_model == model))
        }

        fn record(&mut self, skill: ExtractedSkill) -> Result<ExtractionId, Self::Error> {
            if Some(skill.paper_id) == self.fail_record_for {
                return Err("constraint violated".to_string());
            }
            let id = skill.id;
            self.results.push(skill);
            Ok(id)
        }
    }

    /// Hashing model that fails to embed any text containing `poison`
    struct FlakyModel {
        inner: HashingEmbeddingModel,
        poison: &'static str,
    }

    impl EmbeddingModel for FlakyModel {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if text.contains(self.poison) {
                return Err(EmbeddingError::Inference(format!("cannot embed '{}'", text)));
            }
            self.inner.embed(text)
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.inner.embed_batch(texts)
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        fn model_id(&self) -> &str {
            self.inner.model_id()
        }
    }

    #[test]
    fn test_end_to_end_python_rust_cooking() {
        let index = index(&["Python", "Rust", "Cooking"]);
        let extractor = SkillExtractor::new(&index, config(2)).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let id = add_paper(&mut store, "10.1/e2e", Some(2021), &["Alice Wong"], Some(PYTHON_RUST_ABSTRACT));

        let report = extractor.run(&mut store, &ExtractionRequest::default()).unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.results_created, 2);
        assert!(report.failures.is_empty());
        assert_eq!(report.model_id, "hashing-384");

        let skills = store.skills_for_paper(id, Some("hashing-384")).unwrap();
        let mut names: Vec<&str> = skills.iter().map(|s| s.skill_name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Python", "Rust"]);

        for skill in &skills {
            assert!(skill.confidence > 0.0 && skill.confidence <= 1.0);
            assert_eq!(skill.embedding_model, "hashing-384");
            assert!(skill.author_name.is_none(), "No author filter, no attribution");
        }
    }

    #[test]
    fn test_best_skill_is_stored_first() {
        let index = index(&["Python", "Rust", "Cooking"]);
        let extractor = SkillExtractor::new(&index, config(2)).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let id = add_paper(&mut store, "10.1/rank", None, &[], Some("We use python for data analysis"));
        extractor.run(&mut store, &ExtractionRequest::default()).unwrap();

        let skills = store.skills_for_paper(id, None).unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].skill_name, "Python");
        assert!(skills[0].confidence > 0.0);
        assert!(skills[0].confidence >= skills[1].confidence);
        // Rust and Cooking both score zero; taxonomy order decides
        assert_eq!(skills[1].skill_name, "Rust");
    }

    #[test]
    fn test_embedding_failure_does_not_stop_run() {
        let taxonomy = SkillTaxonomy::from_labels(["Python", "Rust"]).unwrap();
        let model = FlakyModel {
            inner: HashingEmbeddingModel::default(),
            poison: "corrupted",
        };
        let index = EmbeddingIndex::build(taxonomy, model).unwrap();
        let extractor = SkillExtractor::new(&index, config(1)).unwrap();

        let mut store =
            MemoryStore::with_abstracts(&[Some("python data"), Some("corrupted text"), Some("rust code")]);
        let report = extractor.run(&mut store, &ExtractionRequest::default()).unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.results_created, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].paper_id, PaperId::new(2));
        assert!(report.failures[0].message.contains("cannot embed"));

        let model_id = index.model_id();
        assert!(store.has_results(PaperId::new(1), model_id).unwrap());
        assert!(!store.has_results(PaperId::new(2), model_id).unwrap());
        assert!(store.has_results(PaperId::new(3), model_id).unwrap());
    }

    #[test]
    fn test_deterministic_across_runs() {
        let index = index(&["Python", "Rust", "Cooking", "Statistics", "Data analysis"]);
        let extractor = SkillExtractor::new(&index, config(3)).unwrap();

        let run = || {
            let mut store = SqliteStore::new(":memory:").unwrap();
            let id = add_paper(&mut store, "10.1/d", None, &[], Some(PYTHON_RUST_ABSTRACT));
            extractor.run(&mut store, &ExtractionRequest::default()).unwrap();
            store
                .skills_for_paper(id, None)
                .unwrap()
                .into_iter()
                .map(|s| (s.skill_name, s.confidence))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_k_bounds_fail_fast() {
        let index = index(&["Python", "Rust"]);

        let result = SkillExtractor::new(&index, config(0));
        assert!(matches!(
            result,
            Err(ExtractorError::Match(MatchError::InvalidK { k: 0, available: 2 }))
        ));

        let result = SkillExtractor::new(&index, config(3));
        assert!(matches!(
            result,
            Err(ExtractorError::Match(MatchError::InvalidK { k: 3, available: 2 }))
        ));

        assert!(SkillExtractor::new(&index, config(2)).is_ok());
    }

    #[test]
    fn test_tie_break_prefers_taxonomy_order() {
        // Same tokens, so identical embeddings
        let index = index(&["Cooking", "Rust", "rust!", "RUST"]);
        let extractor = SkillExtractor::new(&index, config(3)).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let id = add_paper(&mut store, "10.1/tie", None, &[], Some("Rust"));
        extractor.run(&mut store, &ExtractionRequest::default()).unwrap();

        let names: Vec<String> = store
            .skills_for_paper(id, None)
            .unwrap()
            .into_iter()
            .map(|s| s.skill_name)
            .collect();
        assert_eq!(names, vec!["Rust", "rust!", "RUST"]);
    }

    #[test]
    fn test_idempotent_under_default_policy() {
        let index = index(&["Python", "Rust", "Cooking"]);
        let extractor = SkillExtractor::new(&index, config(2)).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let ids: Vec<PaperId> = (0..5)
            .map(|i| add_paper(&mut store, &format!("10.1/{}", i), None, &[], Some(PYTHON_RUST_ABSTRACT)))
            .collect();

        let first = extractor.run(&mut store, &ExtractionRequest::default()).unwrap();
        assert_eq!(first.processed, 5);
        assert_eq!(count_rows(&store, &ids), 10);

        let second = extractor.run(&mut store, &ExtractionRequest::default()).unwrap();
        assert_eq!(second.processed, 0);
        assert_eq!(second.skipped_existing, 5);
        assert_eq!(second.results_created, 0);
        assert_eq!(count_rows(&store, &ids), 10);
    }

    #[test]
    fn test_reprocess_appends_new_batch() {
        let index = index(&["Python", "Rust", "Cooking"]);
        let extractor = SkillExtractor::new(&index, config(2)).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let id = add_paper(&mut store, "10.1/r", None, &[], Some(PYTHON_RUST_ABSTRACT));

        extractor.run(&mut store, &ExtractionRequest::default()).unwrap();
        let report = extractor
            .run(&mut store, &ExtractionRequest::default().with_reprocess(true))
            .unwrap();
        assert_eq!(report.processed, 1);

        let skills = store.skills_for_paper(id, None).unwrap();
        assert_eq!(skills.len(), 4, "Old and new batches coexist");
        let mut ids: Vec<ExtractionId> = skills.iter().map(|s| s.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_skip_policy_is_per_model() {
        let taxonomy = SkillTaxonomy::from_labels(["Python", "Rust"]).unwrap();
        let small = EmbeddingIndex::build(taxonomy.clone(), HashingEmbeddingModel::new(256)).unwrap();
        let large = EmbeddingIndex::build(taxonomy, HashingEmbeddingModel::new(512)).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let id = add_paper(&mut store, "10.1/m", None, &[], Some(PYTHON_RUST_ABSTRACT));

        SkillExtractor::new(&small, config(1))
            .unwrap()
            .run(&mut store, &ExtractionRequest::default())
            .unwrap();
        let report = SkillExtractor::new(&large, config(1))
            .unwrap()
            .run(&mut store, &ExtractionRequest::default())
            .unwrap();

        assert_eq!(report.processed, 1, "A different model is not skipped");
        assert_eq!(store.skills_for_paper(id, Some("hashing-256")).unwrap().len(), 1);
        assert_eq!(store.skills_for_paper(id, Some("hashing-512")).unwrap().len(), 1);
    }

    #[test]
    fn test_filter_conjunction() {
        let index = index(&["Python", "Rust", "Cooking"]);
        let extractor = SkillExtractor::new(&index, config(1)).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let mut ids = Vec::new();
        for (i, year) in (2018..=2022).enumerate() {
            let author = if i % 2 == 0 { "Alice Wong" } else { "Bob Stone" };
            ids.push(add_paper(
                &mut store,
                &format!("10.1/{}", year),
                Some(year),
                &[author],
                Some(PYTHON_RUST_ABSTRACT),
            ));
        }

        let request = ExtractionRequest::new(
            CorpusFilter::by_author("alice").with_years(Some(2020), Some(2021)),
        );
        assert_eq!(extractor.eligible_count(&store, &request).unwrap(), 1);

        let report = extractor.run(&mut store, &request).unwrap();
        assert_eq!(report.processed, 1);

        // Only the 2020 Alice paper (third inserted) has results
        for (i, id) in ids.iter().enumerate() {
            let expected = if i == 2 { 1 } else { 0 };
            assert_eq!(store.skills_for_paper(*id, None).unwrap().len(), expected);
        }
    }

    #[test]
    fn test_empty_abstracts_are_not_processed() {
        let index = index(&["Python", "Rust"]);
        let extractor = SkillExtractor::new(&index, config(1)).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let blank = add_paper(&mut store, "10.1/blank", None, &[], Some("   "));
        let missing = add_paper(&mut store, "10.1/none", None, &[], None);
        let good = add_paper(&mut store, "10.1/good", None, &[], Some("Rust"));

        let report = extractor.run(&mut store, &ExtractionRequest::default()).unwrap();
        assert_eq!(report.processed, 1);
        assert!(report.failures.is_empty());
        assert!(store.skills_for_paper(blank, None).unwrap().is_empty());
        assert!(store.skills_for_paper(missing, None).unwrap().is_empty());
        assert_eq!(store.skills_for_paper(good, None).unwrap().len(), 1);
    }

    #[test]
    fn test_blank_abstract_from_corpus_is_skipped() {
        let index = index(&["Python", "Rust"]);
        let extractor = SkillExtractor::new(&index, config(1)).unwrap();

        let mut store = MemoryStore::with_abstracts(&[Some("Rust"), Some(" \n"), None, Some("Python")]);
        let report = extractor.run(&mut store, &ExtractionRequest::default()).unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.skipped_empty, 2);
        assert!(report.failures.is_empty());
        assert_eq!(store.results.len(), 2);
    }

    #[test]
    fn test_attribution_filter_value() {
        let index = index(&["Python", "Rust"]);
        let extractor = SkillExtractor::new(&index, config(1)).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let id = add_paper(&mut store, "10.1/a", None, &["Bob Stone", "Alice Wong"], Some("Rust"));

        let request = ExtractionRequest::new(CorpusFilter::by_author("alice"));
        extractor.run(&mut store, &request).unwrap();

        let skills = store.skills_for_paper(id, None).unwrap();
        assert_eq!(skills[0].author_name.as_deref(), Some("alice"));
    }

    #[test]
    fn test_attribution_paper_author() {
        let index = index(&["Python", "Rust"]);
        let mut cfg = config(1);
        cfg.attribution = "paper-author".to_string();
        let extractor = SkillExtractor::new(&index, cfg).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let id = add_paper(&mut store, "10.1/a", None, &["Bob Stone", "Alice Wong"], Some("Rust"));

        let request = ExtractionRequest::new(CorpusFilter::by_author("alice"));
        extractor.run(&mut store, &request).unwrap();

        let skills = store.skills_for_paper(id, None).unwrap();
        assert_eq!(skills[0].author_name.as_deref(), Some("Alice Wong"));
    }

    #[test]
    fn test_skill_uri_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.csv");
        std::fs::write(
            &path,
            "conceptUri,preferredLabel\nhttp://esco/python,Python\nhttp://esco/rust,Rust\n",
        )
        .unwrap();

        let taxonomy = SkillTaxonomy::load(&path).unwrap();
        let index = EmbeddingIndex::build(taxonomy, HashingEmbeddingModel::default()).unwrap();
        let extractor = SkillExtractor::new(&index, config(1)).unwrap();

        let mut store = SqliteStore::new(":memory:").unwrap();
        let id = add_paper(&mut store, "10.1/u", None, &[], Some("Rust"));
        extractor.run(&mut store, &ExtractionRequest::default()).unwrap();

        let skills = store.skills_for_paper(id, None).unwrap();
        assert_eq!(skills[0].skill_name, "Rust");
        assert_eq!(skills[0].skill_uri.as_deref(), Some("http://esco/rust"));
    }

    #[test]
    fn test_persistence_failure_does_not_stop_run() {
        let index = index(&["Python", "Rust"]);
        let extractor = SkillExtractor::new(&index, config(2)).unwrap();

        let mut store = MemoryStore::with_abstracts(&[Some("Rust"), Some("Python"), Some("Rust Python")]);
        store.fail_record_for = Some(PaperId::new(2));

        let report = extractor.run(&mut store, &ExtractionRequest::default()).unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].paper_id, PaperId::new(2));
        assert!(report.failures[0].message.contains("constraint violated"));
        assert!(!store.has_results(PaperId::new(2), index.model_id()).unwrap());
    }

    #[test]
    fn test_corpus_error_aborts_run() {
        let index = index(&["Python"]);
        let extractor = SkillExtractor::new(&index, config(1)).unwrap();

        let mut store = MemoryStore::with_abstracts(&[Some("Python")]);
        store.fail_reads = true;

        let result = extractor.run(&mut store, &ExtractionRequest::default());
        assert!(matches!(result, Err(ExtractorError::Store(msg)) if msg.contains("disk on fire")));
    }

    #[test]
    fn test_progress_events() {
        let index = index(&["Python", "Rust"]);
        let extractor = SkillExtractor::new(&index, config(1)).unwrap();

        let mut store = MemoryStore::with_abstracts(&[Some("Rust"), None, Some("Python")]);
        extractor.run(&mut store, &ExtractionRequest::default()).unwrap();

        let mut events = Vec::new();
        let report = extractor
            .run_with_progress(&mut store, &ExtractionRequest::default(), |event| {
                events.push(event.clone())
            })
            .unwrap();

        assert_eq!(events.len(), report.total_seen());
        assert_eq!(
            events,
            vec![
                ExtractionEvent::Skipped {
                    paper_id: PaperId::new(1),
                    reason: SkipReason::ExistingResults,
                },
                ExtractionEvent::Skipped {
                    paper_id: PaperId::new(2),
                    reason: SkipReason::EmptyAbstract,
                },
                ExtractionEvent::Skipped {
                    paper_id: PaperId::new(3),
                    reason: SkipReason::ExistingResults,
                },
            ]
        );
    }

    #[test]
    fn test_paging_covers_large_corpus() {
        let index = index(&["Python", "Rust"]);
        let extractor = SkillExtractor::new(
            &index,
            ExtractorConfig {
                page_size: 3,
                ..config(1)
            },
        )
        .unwrap();

        let abstracts: Vec<Option<&str>> = (0..10).map(|_| Some("Rust")).collect();
        let mut store = MemoryStore::with_abstracts(&abstracts);
        let report = extractor.run(&mut store, &ExtractionRequest::default()).unwrap();

        assert_eq!(report.processed, 10);
        assert_eq!(store.results.len(), 10);
    }
}
