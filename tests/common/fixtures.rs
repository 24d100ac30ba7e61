/// Two repeated elements, used by the basic expansion scenarios.
pub const TWO_AS: &str = "<r><a>1</a><a>2</a></r>";

/// Orders with line items, attributes and a namespaced extension element.
pub const ORDERS: &str = r#"<orders xmlns:ext="urn:ext">
    <order id="o1" customer="acme">
        <item sku="a1"><qty>2</qty><price>9.50</price></item>
        <item sku="b2"><qty>1</qty><price>20.00</price></item>
    </order>
    <order id="o2" customer="globex">
        <item sku="a1"><qty>5</qty><price>9.50</price></item>
        <ext:gift wrap="yes">card</ext:gift>
    </order>
    <order id="o3" customer="acme"/>
</orders>"#;

/// A small XML-Schema document.
pub const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="order" type="OrderType"/>
    <xs:complexType name="OrderType">
        <xs:sequence>
            <xs:element ref="item"/>
            <xs:element name="note" type="xs:string"/>
        </xs:sequence>
        <xs:attribute name="id" use="required"/>
    </xs:complexType>
</xs:schema>"#;
