use serde::Serialize;

/// Stand-in for the query result in every example; the model sees the real
/// result only for the question being answered.
pub const SQL_RESULT_PLACEHOLDER: &str = "Result of the SQL query";

/// A worked question / query / answer triple used as in-context demonstration.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FewShotExample {
    pub question: &'static str,
    pub sql_query: &'static str,
    pub sql_result: &'static str,
    pub answer: &'static str,
}

// Query strings are stored as written, including the loose spacing in some
// join predicates.
static FEW_SHOTS: [FewShotExample; 5] = [
    FewShotExample {
        question: "Who reports to William Patterson?",
        sql_query: "SELECT CONCAT(reports.firstname, ' ', reports.lastname) AS Employee FROM Employees boss JOIN Employees reports ON boss.employeeNumber = reports.reportsTo WHERE boss.firstName = 'William' and boss.lastName = 'Patterson';",
        sql_result: SQL_RESULT_PLACEHOLDER,
        answer: "'Andy Fixter', 'Peter Marsh', 'Tom King'",
    },
    FewShotExample {
        question: "Compute the commission for each sales representative, assuming the commission is 5% of the value of an order. Sort by employee last name and first name",
        sql_query: "SELECT CONCAT(firstName, ' ',lastName) AS Name, FORMAT(.05 * SUM(quantityOrdered * priceEach),0) AS Commission FROM Employees JOIN Customers ON Employees.employeeNumber = Customers.salesRepEmployeeNumber JOIN Orders ON Customers.customerNumber = Orders.customerNumber JOIN OrderDetails ON Orders.orderNumber = OrderDetails.orderNumber GROUP BY employeeNumber ORDER BY lastName, firstName ASC;",
        sql_result: SQL_RESULT_PLACEHOLDER,
        answer: "'Loui Bondur, 28,474', 'Larry Bott, 36,605', 'Pamela Castillo, 43,411', 'Julie Firrelli, 19,333','Andy Fixter, 28,129', 'Martin Gerard, 19,374'......",
    },
    FewShotExample {
        question: "What are the top 3 products by quantity of on hand for products listed on 'On Hold' orders?",
        sql_query: "SELECT productName, FORMAT(quantityInStock,0) AS `Quantity in stock` FROM OrderDetails JOIN Orders ON Orders.orderNumber = OrderDetails.orderNumber JOIN Products on OrderDetails.productCode = Products.productCode WHERE status = 'On Hold' order by quantityInStock desc limit 3;",
        sql_result: SQL_RESULT_PLACEHOLDER,
        answer: "'America West Airlines B757-200, 9,653', '2002 Chevy Corvette, 9,446', '1912 Ford Model T Delivery Wagon, 9,173'",
    },
    FewShotExample {
        question: "What is the value of orders shipped in August 2004?",
        sql_query: "SELECT FORMAT(SUM(quantityOrdered*priceEach),0) as orderValue FROM Orders JOIN OrderDetails ON Orders.orderNumber = OrderDetails. orderNumber AND YEAR(orderDate) = 2004 AND MONTH(orderDate) = 8;",
        sql_result: SQL_RESULT_PLACEHOLDER,
        answer: "419,327",
    },
    FewShotExample {
        question: "What is the difference in the amount received for each month of 2004 compared to 2003?",
        sql_query: "WITH t2003 AS (SELECT YEAR(paymentDate) AS 'year', MONTH(paymentDate) AS 'month', sum(amount) AS amount FROM Payments WHERE YEAR(paymentDate) = 2003 GROUP BY YEAR(paymentDate), MONTH(paymentDate)), t2004 AS (SELECT YEAR(paymentDate) AS 'year', MONTH(paymentDate) AS 'month', sum(amount) AS amount FROM Payments WHERE YEAR(paymentDate) = 2004 GROUP BY YEAR(paymentDate), MONTH(paymentDate)) SELECT t2003.month,format((t2004.amount - t2003.amount),2) AS variance FROM t2003 JOIN t2004 ON t2003.month = t2004.month ORDER BY t2003.month;",
        sql_result: SQL_RESULT_PLACEHOLDER,
        answer: "'1, 207,884.51', '2, -37,732.35', '3, 204,898.73'",
    },
];

/// The example corpus, in declaration order.
pub fn few_shots() -> &'static [FewShotExample] {
    &FEW_SHOTS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(question_fragment: &str) -> &'static FewShotExample {
        few_shots()
            .iter()
            .find(|ex| ex.question.contains(question_fragment))
            .expect("example present")
    }

    #[test]
    fn corpus_has_five_complete_records() {
        let examples = few_shots();
        assert_eq!(examples.len(), 5);
        for ex in examples {
            assert!(!ex.question.is_empty());
            assert!(!ex.sql_query.is_empty());
            assert!(!ex.sql_result.is_empty());
            assert!(!ex.answer.is_empty());
        }
    }

    #[test]
    fn every_result_is_the_placeholder() {
        assert!(few_shots()
            .iter()
            .all(|ex| ex.sql_result == "Result of the SQL query"));
    }

    #[test]
    fn william_patterson_answer() {
        let ex = find("Who reports to William Patterson?");
        assert_eq!(ex.answer, "'Andy Fixter', 'Peter Marsh', 'Tom King'");
    }

    #[test]
    fn august_2004_answer_and_query_kept_verbatim() {
        let ex = find("value of orders shipped in August 2004");
        assert_eq!(ex.answer, "419,327");
        assert!(ex.sql_query.contains("OrderDetails. orderNumber"));
    }

    #[test]
    fn order_is_stable() {
        let questions: Vec<_> = few_shots().iter().map(|ex| ex.question).collect();
        assert!(questions[0].starts_with("Who reports"));
        assert!(questions[4].starts_with("What is the difference"));
    }

    #[test]
    fn serializes_with_field_names() {
        let json = serde_json::to_value(few_shots()[3]).unwrap();
        assert_eq!(json["answer"], "419,327");
        assert_eq!(json["sql_result"], SQL_RESULT_PLACEHOLDER);
    }
}
