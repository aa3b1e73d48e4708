use chrono::NaiveDate;
use fake::faker::lorem::en::Sentence;
use fake::{Fake, Faker};
use fintrack_repo::transaction_repo::NewTransaction;
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashSet;

pub trait Generator<T> {
    fn gen(&mut self) -> T;
}

pub struct Predefined<T> {
    values: Vec<T>,
    current_pos: usize,
}

impl<T> Predefined<T> {
    pub fn boxed(values: Vec<T>) -> Box<Predefined<T>> {
        Box::new(Predefined {
            values,
            current_pos: 0,
        })
    }
}

impl<T: Clone> Generator<T> for Predefined<T> {
    fn gen(&mut self) -> T {
        let v = self.values[self.current_pos].clone();
        self.current_pos += 1;
        v
    }
}

pub struct FakeGenerator<F: Fake> {
    fake: F,
}

impl<F: Fake> FakeGenerator<F> {
    pub fn boxed(fake: F) -> Box<FakeGenerator<F>> {
        Box::new(FakeGenerator { fake })
    }
}

impl<T: fake::Dummy<F>, F> Generator<T> for FakeGenerator<F> {
    fn gen(&mut self) -> T {
        self.fake.fake()
    }
}

/// Amounts within the ledger's fixed precision range, two decimal places.
pub struct FakeAmount;

impl Generator<Decimal> for FakeAmount {
    fn gen(&mut self) -> Decimal {
        Decimal::new(rand::thread_rng().gen_range(-99_999_999..=99_999_999), 2)
    }
}

pub struct NoTags;

impl Generator<HashSet<i32>> for NoTags {
    fn gen(&mut self) -> HashSet<i32> {
        HashSet::new()
    }
}

#[allow(dead_code)]
pub struct NewTransactionGenerator {
    account_id: i32,
    desc_gen: Box<dyn Generator<String>>,
    date_gen: Box<dyn Generator<NaiveDate>>,
    amnt_gen: Box<dyn Generator<Decimal>>,
    tag_gen: Box<dyn Generator<HashSet<i32>>>,
}

#[allow(dead_code)]
impl NewTransactionGenerator {
    pub fn for_account(account_id: i32) -> NewTransactionGenerator {
        NewTransactionGenerator {
            account_id,
            desc_gen: FakeGenerator::boxed(Sentence(3..8)),
            date_gen: FakeGenerator::boxed(Faker),
            amnt_gen: Box::new(FakeAmount),
            tag_gen: Box::new(NoTags),
        }
    }

    pub fn with_amounts(mut self, amounts: Vec<Decimal>) -> NewTransactionGenerator {
        self.amnt_gen = Predefined::boxed(amounts);
        self
    }

    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> NewTransactionGenerator {
        self.date_gen = Predefined::boxed(dates);
        self
    }

    pub fn with_descriptions(mut self, descriptions: Vec<&str>) -> NewTransactionGenerator {
        let descriptions = descriptions.into_iter().map(|d| d.to_string()).collect();
        self.desc_gen = Predefined::boxed(descriptions);
        self
    }

    pub fn with_tags(mut self, tags: Vec<HashSet<i32>>) -> NewTransactionGenerator {
        self.tag_gen = Predefined::boxed(tags);
        self
    }

    pub fn generate(&mut self) -> NewTransaction {
        NewTransaction::new(
            self.account_id,
            self.amnt_gen.gen(),
            self.desc_gen.gen(),
            self.date_gen.gen(),
            self.tag_gen.gen(),
        )
    }

    pub fn generate_many(&mut self, count: usize) -> Vec<NewTransaction> {
        let mut vec = Vec::with_capacity(count);
        for _ in 0..count {
            vec.push(self.generate())
        }
        vec
    }
}
