use rayon::prelude::*;
use tracing::debug;

use crate::classifier::corpus::{Corpus, TermFrequency};
use crate::error::{Result, StructureError};

/// Document counts of one (term, category) pair, cross-classified by
/// "contains the term" and "belongs to the category".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContingencyCounts {
    /// in category, contains term
    pub n11: u64,
    /// outside category, contains term
    pub n10: u64,
    /// in category, lacks term
    pub n01: u64,
    /// outside category, lacks term
    pub n00: u64,
}

impl ContingencyCounts {
    #[inline]
    pub fn total(&self) -> u64 {
        self.n11 + self.n10 + self.n01 + self.n00
    }

    /// add-one correction on every cell
    #[inline]
    pub fn smoothed(self) -> Self {
        ContingencyCounts {
            n11: self.n11 + 1,
            n10: self.n10 + 1,
            n01: self.n01 + 1,
            n00: self.n00 + 1,
        }
    }
}

/// Per (term rank, category rank) document frequencies over the whole corpus.
///
/// Only `n11` is stored; the other three cells follow from the term's corpus
/// document frequency and the category size.
#[derive(Debug, Clone)]
pub struct ContingencyTable {
    /// `[term * num_categories + category]`
    docs_with_term: Vec<u32>,
    term_doc_freq: Vec<u64>,
    category_docs: Vec<u64>,
    total_docs: u64,
    num_terms: usize,
    num_categories: usize,
}

impl ContingencyTable {
    /// Count document frequencies, one category column per rayon task.
    pub fn compute(corpus: &Corpus) -> Result<Self> {
        let vocabulary = corpus.vocabulary();
        let num_terms = vocabulary.len();
        let groups: Vec<&Vec<TermFrequency>> = corpus.categories().values().collect();
        let num_categories = groups.len();

        let columns = groups
            .par_iter()
            .map(|docs| -> std::result::Result<Vec<u32>, StructureError> {
                let mut column = vec![0u32; num_terms];
                for doc in docs.iter() {
                    for term in doc.terms() {
                        column[vocabulary.rank_of(term)?] += 1;
                    }
                }
                Ok(column)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut docs_with_term = vec![0u32; num_terms * num_categories];
        let mut term_doc_freq = vec![0u64; num_terms];
        for (c, column) in columns.iter().enumerate() {
            for (t, &n) in column.iter().enumerate() {
                docs_with_term[t * num_categories + c] = n;
                term_doc_freq[t] += u64::from(n);
            }
        }
        let category_docs: Vec<u64> = groups.iter().map(|docs| docs.len() as u64).collect();
        let total_docs: u64 = category_docs.iter().sum();
        debug!(
            terms = num_terms,
            categories = num_categories,
            documents = total_docs,
            "contingency counts merged"
        );

        Ok(ContingencyTable {
            docs_with_term,
            term_doc_freq,
            category_docs,
            total_docs,
            num_terms,
            num_categories,
        })
    }

    /// Raw (unsmoothed) cells for `term` × `category`, both given by rank.
    pub fn counts(&self, term: usize, category: usize) -> Result<ContingencyCounts> {
        if term >= self.num_terms {
            return Err(StructureError::IndexOutOfRange {
                index: term,
                len: self.num_terms,
            }
            .into());
        }
        if category >= self.num_categories {
            return Err(StructureError::IndexOutOfRange {
                index: category,
                len: self.num_categories,
            }
            .into());
        }
        let n11 = u64::from(self.docs_with_term[term * self.num_categories + category]);
        let n10 = self.term_doc_freq[term] - n11;
        let n01 = self.category_docs[category] - n11;
        let n00 = self.total_docs - self.category_docs[category] - n10;
        Ok(ContingencyCounts { n11, n10, n01, n00 })
    }

    #[inline]
    pub fn total_documents(&self) -> u64 {
        self.total_docs
    }

    #[inline]
    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    #[inline]
    pub fn num_categories(&self) -> usize {
        self.num_categories
    }
}
